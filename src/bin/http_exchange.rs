//! 单次 HTTP 请求/响应交换
//!
//! 读取场景 JSON（可选），应用命令行覆盖项，运行仿真并打印一行汇总。

use clap::Parser;
use netstack_sim::net::NetWorld;
use netstack_sim::sim::{ScenarioSpec, SimTime, Simulator};
use netstack_sim::topo::point_to_point::{build_exchange, schedule_request};
use netstack_sim::trace::TraceLog;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "http_exchange",
    about = "Simulate one HTTP request/response over a segmented, lossy link"
)]
struct Args {
    /// Path to scenario.json; built-in defaults when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override MSS of both endpoints (bytes)
    #[arg(long)]
    mss: Option<usize>,

    /// Override loss probability of both links
    #[arg(long)]
    loss: Option<f64>,

    /// Override medium of both links (e.g. fiber, localtalk)
    #[arg(long)]
    medium: Option<String>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop at this simulated time (ms); defaults to running until idle
    #[arg(long)]
    until_ms: Option<u64>,

    /// Write the frame trace as a JSON array
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn apply_overrides(spec: &mut ScenarioSpec, args: &Args) {
    if let Some(mss) = args.mss {
        spec.client.mss = mss;
        spec.server.mss = mss;
    }
    if let Some(loss) = args.loss {
        spec.uplink.loss = loss;
        spec.downlink.loss = loss;
    }
    if let Some(medium) = &args.medium {
        spec.uplink.medium = medium.clone();
        spec.downlink.medium = medium.clone();
        // 历史介质使用预设速率
        spec.uplink.rate_bps = None;
        spec.downlink.rate_bps = None;
    }
    if let Some(seed) = args.seed {
        spec.seed = seed;
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut spec = match &args.scenario {
        Some(path) => match ScenarioSpec::load(path) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "加载场景失败");
                eprintln!("error: {e}");
                return ExitCode::from(2);
            }
        },
        None => ScenarioSpec::default(),
    };
    apply_overrides(&mut spec, &args);

    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    if args.trace_json.is_some() {
        world.net.trace = Some(TraceLog::default());
    }

    let ex = match build_exchange(&mut world, &spec) {
        Ok(ex) => ex,
        Err(e) => {
            error!(error = %e, "构建拓扑失败");
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    schedule_request(&mut sim, &ex, &spec);

    match args.until_ms {
        Some(ms) => sim.run_until(SimTime::from_millis(ms), &mut world),
        None => sim.run(&mut world),
    }

    let net = &world.net;
    let (Some(client), Some(server)) = (net.endpoint(ex.client), net.endpoint(ex.server)) else {
        eprintln!("error: endpoints missing after run");
        return ExitCode::FAILURE;
    };
    let lost: u64 = net.links().iter().map(|l| l.stats().lost_frames).sum();
    let delivered: u64 = net.links().iter().map(|l| l.stats().delivered_frames).sum();
    let status = client
        .responses()
        .last()
        .map(|r| r.status.to_string())
        .unwrap_or_else(|| "none".to_string());

    info!(events = sim.executed(), "交换结束");
    println!(
        "exchange done @ {}, status={}, request_frames={}, response_frames={}, \
         delivered_frames={}, lost_frames={}, requests_seen={}, responses_seen={}",
        sim.now(),
        status,
        client.stats().frames_sent,
        server.stats().frames_sent,
        delivered,
        lost,
        server.requests().len(),
        client.responses().len(),
    );

    if let (Some(path), Some(log)) = (&args.trace_json, &net.trace) {
        if let Err(e) = log.write_json(path) {
            eprintln!("error: failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
