//! Concurrent load against the dispatcher.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use rpc_transport::{RequestContext, Router, TransportConfig};

mod common;

#[tokio::test]
async fn test_concurrent_requests() {
    let router = Router::builder()
        .post("/work", |ctx: RequestContext| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            let mut response = ctx.response();
            response.message = format!("{} bytes", ctx.body.len());
            ctx.send(response)
        })
        .build();
    let server = common::start_server(TransportConfig::default(), router).await;

    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = server.url("/work");
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.post(&url).body("payload").send().await {
                    if res.status() == StatusCode::OK {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        succeeded += task.await.unwrap();
    }
    let duration = start.elapsed();

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Succeeded:      {}", succeeded);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("-------------------------\n");

    assert_eq!(succeeded, total_requests);

    let stats = client
        .get(server.url("/internal/stats"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let line = stats
        .lines()
        .find(|l| l.starts_with("[POST] /work: "))
        .expect("work route rendered");
    assert!(line.contains("\"min\":"), "unexpected stats line: {}", line);
}
