//! # callstat-network
//!
//! 네트워크 어댑터.
//! Amazon Connect 분석 API 조회(aws-sdk-connect), 큐 단위 병렬 수집,
//! 웹훅 알림 전송(reqwest)을 담당하며 공통 지수 백오프 재시도 정책을 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use callstat_network::connect_source::ConnectMetricsSource;
//! use callstat_network::fetcher::ConcurrentMetricsFetcher;
//! use callstat_network::webhook::WebhookNotifier;
//!
//! let source = Arc::new(ConnectMetricsSource::from_region(Some(region)).await);
//! let fetcher = ConcurrentMetricsFetcher::from_config(source, &config);
//! let notifier = WebhookNotifier::from_config(&config)?;
//! ```

pub mod connect_source;
pub mod fetcher;
pub mod retry;
pub mod webhook;
