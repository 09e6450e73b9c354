//! # callstat-app
//!
//! callstat 바이너리 진입점.
//! 표준 입력의 트리거 이벤트(JSON)를 읽어 리포트 파이프라인을 1회 실행하고,
//! 호출 결과(JSON)를 표준 출력에 쓴다. 로그는 표준 에러로만 나간다.

mod handler;

use anyhow::{Context, Result};
use callstat_core::config::AppConfig;
use std::io::Read;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 로그 레벨 환경변수 (RUST_LOG가 없을 때 사용)
const ENV_LOG_LEVEL: &str = "CALLSTAT_LOG_LEVEL";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let log_level = std::env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string());
    let log_filter = format!(
        "callstat={log_level},callstat_app={log_level},callstat_core={log_level},callstat_report={log_level},callstat_network={log_level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("callstat 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("표준 입력 읽기 실패")?;

    // 설정은 호출 시작 시 1회만 읽는다
    let config = AppConfig::from_env();

    let response = handler::handle(&input, &config, chrono::Utc::now()).await;
    println!(
        "{}",
        serde_json::to_string(&response).context("응답 직렬화 실패")?
    );

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
