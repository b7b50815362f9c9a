use std::time::Duration;

use fal_client::*;
use futures::StreamExt;
use mockito::{Matcher, Server, ServerGuard};
use prompt_batch::{expand, run, VariationAxes};
use serde_json::json;

const REQUEST_PATH: &str = "/fal-ai/flux/requests/req-1";

fn client_for(server: &ServerGuard) -> FalClient {
    FalClient::new(FalCredentials::new("test-key").unwrap())
        .with_endpoint(server.url())
        .with_poll_interval(Duration::from_millis(10))
}

fn receipt_body(server: &ServerGuard) -> String {
    json!({
        "request_id": "req-1",
        "status_url": format!("{}{}/status", server.url(), REQUEST_PATH),
        "response_url": format!("{}{}", server.url(), REQUEST_PATH),
    })
    .to_string()
}

async fn mock_queue(server: &mut ServerGuard, model_path: &str, output: serde_json::Value, hits: usize) {
    let receipt = receipt_body(server);
    server
        .mock("POST", model_path)
        .match_header("authorization", "Key test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(receipt)
        .expect(hits)
        .create_async()
        .await;
    server
        .mock("GET", format!("{}/status", REQUEST_PATH).as_str())
        .match_header("authorization", "Key test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "COMPLETED"}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", REQUEST_PATH)
        .match_header("authorization", "Key test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(output.to_string())
        .create_async()
        .await;
}

fn one_image_output() -> serde_json::Value {
    json!({
        "images": [{"url": "https://cdn.fal.media/ring.png", "width": 1024, "height": 1024, "content_type": "image/png"}],
        "seed": 42,
        "has_nsfw_concepts": [false],
        "prompt": "gold ring"
    })
}

#[tokio::test]
async fn test_subscribe_returns_output() {
    let mut server = Server::new_async().await;
    mock_queue(&mut server, "/fal-ai/flux/dev", one_image_output(), 1).await;

    let (args, _) = FluxRequest::new("gold ring").seed(42).build();
    let output = client_for(&server)
        .subscribe(&FluxModel::Dev, &args, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(output.images.len(), 1);
    assert_eq!(output.images[0].url, "https://cdn.fal.media/ring.png");
    assert_eq!(output.seed, Some(42));
}

#[tokio::test]
async fn test_submit_sends_flux_arguments() {
    let mut server = Server::new_async().await;
    let receipt = receipt_body(&server);
    let submit = server
        .mock("POST", "/fal-ai/flux/schnell")
        .match_header("authorization", "Key test-key")
        .match_body(Matcher::PartialJson(json!({
            "prompt": "silver bracelet",
            "image_size": {"width": 768, "height": 1024},
            "num_inference_steps": 28,
            "num_images": 1,
            "enable_safety_checker": true,
            "output_format": "png",
            "seed": 7
        })))
        .with_status(200)
        .with_body(receipt)
        .create_async()
        .await;

    let (args, _) = FluxRequest::new("silver bracelet")
        .image_size(ImageSize::PORTRAIT_3_4)
        .seed(7)
        .build();
    let receipt = client_for(&server)
        .submit(FluxModel::Schnell, &args)
        .await
        .unwrap();

    submit.assert_async().await;
    assert_eq!(receipt.request_id, "req-1");
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/fal-ai/flux/dev")
        .with_status(401)
        .with_body("Invalid key")
        .create_async()
        .await;

    let (args, _) = FluxRequest::new("ring").build();
    let err = client_for(&server)
        .submit(FluxModel::Dev, &args)
        .await
        .unwrap_err();

    match err {
        FalError::Http { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid key");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_subscribe_times_out_while_queued() {
    let mut server = Server::new_async().await;
    let receipt = receipt_body(&server);
    server
        .mock("POST", "/fal-ai/flux/dev")
        .with_status(200)
        .with_body(receipt)
        .create_async()
        .await;
    server
        .mock("GET", format!("{}/status", REQUEST_PATH).as_str())
        .with_status(200)
        .with_body(json!({"status": "IN_QUEUE", "queue_position": 9}).to_string())
        .create_async()
        .await;

    let (args, _) = FluxRequest::new("ring").build();
    let err = client_for(&server)
        .subscribe(FluxModel::Dev, &args, Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(matches!(err, FalError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_image_download() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/ring.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![0x89, b'P', b'N', b'G'])
        .create_async()
        .await;

    let bytes = client_for(&server)
        .image(&format!("{}/files/ring.png", server.url()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_submitter_runs_a_batch() {
    let mut server = Server::new_async().await;
    mock_queue(&mut server, "/fal-ai/flux-pro/v1.1", one_image_output(), 4).await;

    let submitter = FalSubmitter::new(client_for(&server), FluxModel::ProV11)
        .with_timeout(Duration::from_secs(5));
    let tasks = expand("tennis bracelet", 4, &VariationAxes::default()).unwrap();

    let results: Vec<_> = run(tasks, submitter, 2).unwrap().collect().await;

    assert_eq!(results.len(), 4);
    for result in &results {
        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(result.payload().unwrap().url, "https://cdn.fal.media/ring.png");
    }
}

#[tokio::test]
async fn test_submitter_without_images_fails_task() {
    let mut server = Server::new_async().await;
    mock_queue(&mut server, "/fal-ai/flux/dev", json!({"images": []}), 1).await;

    let submitter = FalSubmitter::new(client_for(&server), FluxModel::Dev);
    let tasks = expand("drop earrings", 1, &VariationAxes::default()).unwrap();

    let results: Vec<_> = run(tasks, submitter, 1).unwrap().collect().await;

    assert_eq!(results.len(), 1);
    let error = results[0].error().unwrap();
    assert!(error.contains("returned no images"), "{}", error);
}
