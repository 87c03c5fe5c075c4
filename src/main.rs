//! # 카카오 커스텀 토큰 교환 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩
//! 4. SQLite 연결 풀 생성과 마이그레이션
//! 5. 협력 객체(토큰 발급기, 프로필 저장소, 카카오 검증기) 생성
//! 6. 라우터 조립
//! 7. HTTP 서버 시작 (Ctrl+C / SIGTERM 시 정상 종료)

use std::{sync::Arc, time::Duration}; // Arc: 여러 요청이 협력 객체를 공유하기 위한 참조 카운팅 포인터

use anyhow::{Context, Result}; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use kakao_token_bridge::{
    build_router,                                           // 라우트와 미들웨어를 조립하는 함수
    config::Config,                                         // 우리가 만든 설정 모듈
    db::{self, SqliteProfileStore},                         // 마이그레이션과 SQLite 프로필 저장소
    services::{JwtCustomTokenMinter, KakaoClient, ProviderVerifier}, // 토큰 발급기, 카카오 검증기
    AppState,                                               // 핸들러가 공유하는 상태
};
use sqlx::sqlite::SqlitePoolOptions; // SQLite 연결 풀 설정 옵션
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 이 크레이트와 tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kakao_token_bridge=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        policy = ?config.policy,
        max_concurrent_requests = config.max_concurrent_requests,
        "Starting kakao-token-bridge on {}:{}",
        config.host,
        config.port
    );
    if !config.policy.verify_provider_token {
        tracing::warn!(
            "VERIFY_PROVIDER_TOKEN is off: tokens will be minted for any kakaoUserId without checking the Kakao access token"
        );
    }

    // ── 4단계: SQLite 연결 풀 생성과 마이그레이션 ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.database_url))?;

    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // ── 5단계: 협력 객체 생성 ──
    // 프로세스 시작 시 한 번만 만들고, 이후에는 AppState를 통해 공유합니다.
    let minter = JwtCustomTokenMinter::from_config(&config)
        .context("failed to initialise custom token signer")?;
    tracing::info!(algorithm = ?minter.algorithm(), "Custom token signer ready");

    let verifier: Option<Arc<dyn ProviderVerifier>> = if config.policy.verify_provider_token {
        let client = KakaoClient::new(
            config.kakao_api_base_url.clone(),
            Duration::from_secs(config.kakao_timeout_secs),
        )?;
        Some(Arc::new(client))
    } else {
        None
    };

    let state = AppState {
        minter: Arc::new(minter),
        profiles: Arc::new(SqliteProfileStore::new(pool.clone())),
        verifier,
        policy: config.policy,
    };

    // ── 6단계: 라우터 조립 ──
    // 라우트 + CORS 헤더 + 요청 로깅 + 동시 처리 수 제한을 한 번에 묶습니다.
    let app = build_router(state, config.max_concurrent_requests);

    // ── 7단계: 서버 시작 ──
    // TcpListener: 지정한 주소에서 TCP 연결을 기다리는 리스너
    // with_graceful_shutdown: 종료 시그널을 받으면 진행 중인 요청을 마친 뒤 멈춥니다.
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 기다립니다.
///
/// 이 함수가 끝나면 `axum::serve`가 새 연결을 받지 않고, 처리 중인 요청을 마친 뒤 종료합니다.
/// 시그널 핸들러 등록에 실패한 쪽은 영원히 기다리게(`pending`) 하여,
/// 등록 실패만으로 서버가 곧바로 꺼지지 않도록 합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
