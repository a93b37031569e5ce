use crate::domain::model::{RawReport, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn report_sources(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn concurrent_requests(&self) -> usize;
    fn max_supported_version(&self) -> u32;
    fn strict(&self) -> bool;

    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        None
    }

    fn timeout_seconds(&self) -> Option<u64> {
        None
    }

    fn archive_name(&self) -> &str {
        "member_reports.zip"
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawReport>>;
    async fn transform(&self, data: Vec<RawReport>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
