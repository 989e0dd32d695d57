use std::time::Duration;

use alloy::primitives::U256;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use liqu_flow::backend::{Backend, BackendError, HttpBackend};
use liqu_flow::config::BackendConfig;
use liqu_flow::model::Strategy;

// ── Fake agent API ───────────────────────────────────────────────────

fn strategy_config() -> Value {
    json!({
        "tickRangeMultiplier": 2.0,
        "maxSlippage": 0.005,
        "rebalanceThreshold": 0.1,
        "description": "middle of the road"
    })
}

async fn agents() -> Json<Value> {
    Json(json!({
        "agents": [{
            "agentId": 2,
            "domain": "balanced.liqu.finance.eth",
            "address": "0x6c52aAD1Cbb66C0f666b62b36261d2f2205A8607",
            "strategy": "BALANCED",
            "strategyConfig": strategy_config(),
            "authorized": true
        }]
    }))
}

async fn analyze(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "strategy": body["strategy"],
        "strategyConfig": strategy_config(),
        "pool": { "tick": -42, "price": 0.9958, "liquidity": "123456789" },
        "recommendation": {
            "action": "CREATE_POSITION",
            "tickLower": -600,
            "tickUpper": 540,
            "reason": "low volatility",
            "confidence": 87
        },
        "agentAddress": "0x6c52aAD1Cbb66C0f666b62b36261d2f2205A8607"
    }))
}

async fn rebalance(Path(id): Path<u64>) -> Response {
    match id {
        404 => (StatusCode::NOT_FOUND, Json(json!({ "error": "Deposit not found" }))).into_response(),
        503 => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "agent busy" })))
            .into_response(),
        500 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        // Agent decided nothing needed to move.
        9 => Json(json!({
            "depositId": id,
            "strategy": "CONSERVATIVE",
            "action": "HOLD",
            "previousPositions": [7],
            "newPosition": 7,
            "newTickLower": -600,
            "newTickUpper": 600,
            "reason": "price still in range",
            "pool": { "tick": 3, "price": 1.0003 },
            "updatedDeposit": {
                "amount0Remaining": "0",
                "amount1Remaining": "0",
                "positionTokenIds": [7]
            }
        }))
        .into_response(),
        _ => Json(json!({
            "depositId": id,
            "strategy": "BALANCED",
            "action": "REBALANCE",
            "previousPositions": [7],
            "newPosition": 8,
            "newTickLower": -300,
            "newTickUpper": 300,
            "reason": "price left range",
            "pool": { "tick": 12, "price": 1.0012 },
            "updatedDeposit": {
                "amount0Remaining": "0",
                "amount1Remaining": "0",
                "positionTokenIds": [8]
            },
            "transactions": {
                "close": [{ "positionId": 7, "txHash": "0xaa" }],
                "mint": { "positionId": 8, "txHash": "0xbb" },
                "validationHash": "0xcc"
            }
        }))
        .into_response(),
    }
}

async fn slow_run() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({}))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn backend(timeout: Duration) -> HttpBackend {
    let app = Router::new()
        .route("/api/agents/all", get(agents))
        .route("/api/analyze", post(analyze))
        .route("/api/rebalance/{id}", post(rebalance))
        .route("/api/agent/run", post(slow_run));
    let base_url = spawn(app).await;
    HttpBackend::new(&BackendConfig { base_url, timeout }).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_agents_decodes_roster() {
    let backend = backend(Duration::from_secs(5)).await;
    let roster = backend.list_agents().await.unwrap();

    let agent = roster.find(2).unwrap();
    assert_eq!(agent.strategy, Strategy::Balanced);
    assert_eq!(agent.strategy_config.max_slippage, 0.005);
    assert!(agent.authorized);
    assert!(roster.find(1).is_none());
}

#[tokio::test]
async fn test_analyze_sends_strategy_name() {
    let backend = backend(Duration::from_secs(5)).await;
    let analysis = backend.analyze(Strategy::Degen).await.unwrap();

    assert_eq!(analysis.strategy, "DEGEN");
    assert_eq!(analysis.pool.tick, -42);
    assert_eq!(analysis.recommendation.tick_lower, -600);
    assert_eq!(analysis.recommendation.confidence, 87.0);
}

#[tokio::test]
async fn test_rebalance_success() {
    let backend = backend(Duration::from_secs(5)).await;
    let result = backend.rebalance(U256::from(7u64)).await.unwrap();

    assert_eq!(result.deposit_id, 7);
    assert_eq!(result.previous_positions, vec![7]);
    assert_eq!(result.updated_deposit.position_token_ids, vec![8]);
    let txs = result.transactions.unwrap();
    assert_eq!(txs.close[0].tx_hash, "0xaa");
    assert_eq!(txs.validation_hash, "0xcc");
}

#[tokio::test]
async fn test_rebalance_without_transaction_bundle() {
    let backend = backend(Duration::from_secs(5)).await;
    let result = backend.rebalance(U256::from(9u64)).await.unwrap();

    assert_eq!(result.deposit_id, 9);
    assert_eq!(result.action, "HOLD");
    assert_eq!(result.updated_deposit.position_token_ids, vec![7]);
    assert!(result.transactions.is_none());
}

#[tokio::test]
async fn test_status_errors_carry_server_message() {
    let backend = backend(Duration::from_secs(5)).await;

    assert_eq!(
        backend.rebalance(U256::from(404u64)).await.unwrap_err(),
        BackendError::Status {
            status: 404,
            message: Some("Deposit not found".into()),
        }
    );
    assert_eq!(
        backend.rebalance(U256::from(503u64)).await.unwrap_err(),
        BackendError::Status {
            status: 503,
            message: Some("agent busy".into()),
        }
    );
}

#[tokio::test]
async fn test_empty_error_body_tolerated() {
    let backend = backend(Duration::from_secs(5)).await;
    let err = backend.rebalance(U256::from(500u64)).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 500,
            message: None,
        }
    );
    assert_eq!(err.to_string(), "backend returned 500");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = backend(Duration::from_millis(100)).await;
    assert_eq!(backend.run_agent().await.unwrap_err(), BackendError::Timeout);
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let app = Router::new().route(
        "/api/agents/all",
        get(|| async { Json(json!({ "agents": "none" })) }),
    );
    let base_url = spawn(app).await;
    let backend = HttpBackend::new(&BackendConfig {
        base_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    assert!(matches!(
        backend.list_agents().await,
        Err(BackendError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let backend = HttpBackend::new(&BackendConfig {
        base_url: "http://127.0.0.1:1/api".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    assert!(matches!(
        backend.list_agents().await,
        Err(BackendError::Transport(_))
    ));
}
