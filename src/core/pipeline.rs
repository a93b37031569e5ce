use crate::core::codec::ReportCodec;
use crate::core::summary::{self, SummaryRow};
use crate::core::{ConfigProvider, Pipeline, RawReport, Storage, TransformResult};
use crate::domain::model::{RejectedReport, ReportSource};
use crate::domain::report::MemberReport;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::Validate;
use reqwest::Client;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::write::{SimpleFileOptions, ZipWriter};

pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    codec: ReportCodec,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build()?;
        let codec = ReportCodec::new(config.max_supported_version());

        Ok(Self {
            storage,
            config,
            client,
            codec,
        })
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }

    /// 解碼並驗證單一報表
    fn accept(&self, raw: &RawReport) -> Result<MemberReport> {
        let report = self.codec.decode_slice(&raw.payload)?;
        report.validate()?;

        for warning in report.cross_reference_warnings() {
            tracing::warn!("⚠️ {} ({})", warning, raw.source);
        }

        Ok(report)
    }
}

async fn fetch(
    client: Client,
    source: ReportSource,
    headers: Vec<(String, String)>,
) -> Result<Vec<u8>> {
    match source {
        ReportSource::Http(url) => {
            tracing::debug!("Making API request to: {}", url);
            let mut request = client.get(url.clone());
            for (name, value) in headers {
                request = request.header(name, value);
            }

            let response = request.send().await?;
            tracing::debug!("API response status: {}", response.status());

            if !response.status().is_success() {
                return Err(ReportError::HttpStatusError {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                });
            }

            Ok(response.bytes().await?.to_vec())
        }
        ReportSource::File(path) => {
            tracing::debug!("Reading report file: {}", path.display());
            Ok(tokio::fs::read(&path).await?)
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    /// 取得所有來源的原始內容。
    ///
    /// 任何一個來源失敗 (HTTP 非 2xx、連線錯誤、檔案讀不到) 都會讓整個 extract
    /// 失敗，不論 strict 與否，其他已取得的內容也不會寫出。lenient 模式只針對
    /// 解碼與驗證失敗。
    async fn extract(&self) -> Result<Vec<RawReport>> {
        let sources = self.config.report_sources();
        if sources.is_empty() {
            return Err(ReportError::ConfigError {
                message: "No report sources configured".to_string(),
            });
        }

        let headers: Vec<(String, String)> = self
            .config
            .request_headers()
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        // 限制同時進行的請求數量
        let permits = Arc::new(Semaphore::new(self.config.concurrent_requests().max(1)));
        let mut tasks = JoinSet::new();

        for (index, raw_source) in sources.iter().enumerate() {
            let source = ReportSource::parse(raw_source);
            let client = self.client.clone();
            let headers = headers.clone();
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.map_err(|e| {
                    ReportError::ProcessingError {
                        message: format!("Request limiter closed: {}", e),
                    }
                })?;
                let label = source.to_string();
                let payload = fetch(client, source, headers).await?;
                Ok::<_, ReportError>((index, RawReport {
                    source: label,
                    payload,
                }))
            });
        }

        let mut slots: Vec<Option<RawReport>> = vec![None; sources.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, raw) = joined.map_err(|e| ReportError::ProcessingError {
                message: format!("Fetch task failed: {}", e),
            })??;
            slots[index] = Some(raw);
        }

        // 依設定順序輸出
        let records: Vec<RawReport> = slots.into_iter().flatten().collect();
        tracing::debug!("Fetched {} report payload(s)", records.len());
        Ok(records)
    }

    async fn transform(&self, data: Vec<RawReport>) -> Result<TransformResult> {
        let mut reports = Vec::new();
        let mut rejected = Vec::new();

        for raw in data {
            match self.accept(&raw) {
                Ok(report) => reports.push(report),
                Err(e) if self.config.strict() => {
                    tracing::error!("❌ {}: {}", raw.source, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Rejected {}: {}", raw.source, e);
                    rejected.push(RejectedReport {
                        source: raw.source,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let rows: Vec<SummaryRow> = reports.iter().map(SummaryRow::from_report).collect();

        // 直接序列化 MemberReport 陣列即為每份報表的標準編碼
        let json_output = serde_json::to_string_pretty(&reports)?;

        Ok(TransformResult {
            csv_output: summary::render(&rows, b',')?,
            tsv_output: summary::render(&rows, b'\t')?,
            json_output,
            reports,
            rejected,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let archive_name = self.config.archive_name().to_string();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        // 創建ZIP文件
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            let options = SimpleFileOptions::default();

            if self.wants("json") {
                zip.start_file("reports.json", options)?;
                zip.write_all(result.json_output.as_bytes())?;
            }

            if self.wants("csv") {
                zip.start_file("summary.csv", options)?;
                zip.write_all(result.csv_output.as_bytes())?;
            }

            if self.wants("tsv") {
                zip.start_file("summary.tsv", options)?;
                zip.write_all(result.tsv_output.as_bytes())?;
            }

            if !result.rejected.is_empty() {
                zip.start_file("rejected.json", options)?;
                let json_data = serde_json::to_string_pretty(&result.rejected)?;
                zip.write_all(json_data.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&archive_name, &zip_data).await?;

        Ok(output_path)
    }
}
