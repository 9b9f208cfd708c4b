use hdrhistogram::Histogram;
use rand::{seq::SliceRandom, thread_rng};
use reqwest::Client;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/generate".to_string());
    let model = std::env::args().nth(2).unwrap_or_else(|| "qwen:0.5b".to_string());
    let clients = 8usize; // concurrent
    let total = 200usize; // total requests
    let prompts = vec![
        "Once upon a time",
        "The quick brown fox",
        "In a galaxy far away",
        "Write a haiku about rust",
        "The capital of France is",
        "def fibonacci(n):",
        "Dear diary, today",
        "Three reasons to learn Rust:",
    ];

    let client = Client::builder().pool_idle_timeout(Duration::from_secs(10)).build()?;
    let mut hist = Histogram::<u64>::new(3)?;
    let mut errors = 0usize;

    let start = Instant::now();
    let mut tasks = vec![];
    for _ in 0..clients {
        let client = client.clone();
        let url = url.clone();
        let model = model.clone();
        let prompts = prompts.clone();
        tasks.push(tokio::spawn(async move {
            let mut latencies = vec![];
            let mut errs = 0;
            for _ in 0..(total / clients) {
                let prompt = {
                    let mut rng = thread_rng();
                    prompts.choose(&mut rng).copied().unwrap_or("Hello")
                };
                let t0 = Instant::now();
                let res = client
                    .post(&url)
                    .json(&serde_json::json!({"prompt": prompt, "model_name": model}))
                    .send()
                    .await;
                let dur = t0.elapsed();
                match res {
                    Ok(r) if r.status().is_success() => latencies.push(dur),
                    _ => errs += 1,
                }
            }
            (latencies, errs)
        }));
    }

    for t in tasks {
        let (ls, e) = t.await?;
        for d in ls {
            hist.record(d.as_millis() as u64).ok();
        }
        errors += e;
    }

    println!("ran {} reqs against {} in {:?}", total, model, start.elapsed());
    println!("errors: {}", errors);
    println!("p50: {} ms", hist.value_at_quantile(0.50));
    println!("p95: {} ms", hist.value_at_quantile(0.95));
    println!("p99: {} ms", hist.value_at_quantile(0.99));
    Ok(())
}
