use crate::core::Pipeline;
use crate::utils::error::{ReportError, Result};
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    timing: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            timing: false,
        }
    }

    /// 額外記錄每個階段耗時
    pub fn new_with_timing(pipeline: P, timing: bool) -> Self {
        Self { pipeline, timing }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting member report ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} report payload(s)", raw_data.len());
        self.log_phase("extract", started);

        // Transform
        let total = raw_data.len();
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "🔄 Decoded {} report(s), rejected {}",
            transformed.reports.len(),
            transformed.rejected.len()
        );
        self.log_phase("transform", started);

        let all_rejected = transformed.reports.is_empty() && total > 0;

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.log_phase("load", started);

        // rejected.json 已寫出，但整批沒有任何可用報表仍視為失敗
        if all_rejected {
            return Err(ReportError::ProcessingError {
                message: format!(
                    "All {} report payload(s) were rejected, see {}",
                    total, output_path
                ),
            });
        }

        Ok(output_path)
    }

    fn log_phase(&self, phase: &str, started: Instant) {
        if self.timing {
            tracing::info!("⏱️ {} finished after {:?}", phase, started.elapsed());
        }
    }
}
