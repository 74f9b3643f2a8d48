use dotenvy::dotenv;
use server::startup::{supervise, Exit};
use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // 提前加载 .env，使得 RUST_LOG、CONFIG_PATH 等环境变量生效
    dotenv().ok();

    let cfg = configs::AppConfig::load_or_env();
    let log_format = cfg.as_ref().map(|c| c.server.log_format.as_str()).unwrap_or("compact");
    common::utils::logging::init_logging_with_format(log_format);
    info!(service = "admin-dashboard", event = "logger_init", "tracing subscriber initialized");

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "admin-dashboard", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志，便于排查问题
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "admin-dashboard",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "admin-dashboard", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "admin-dashboard",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "admin dashboard starting"
    );

    rt.block_on(async move {
        let server_task = tokio::spawn(async move {
            if let Err(e) = server::run(cfg).await {
                error!(service = "admin-dashboard", event = "run_failed", error = %e, "server::run returned error");
                Err(e)
            } else {
                Ok(())
            }
        });

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        match supervise(server_task, shutdown).await {
            Exit::Stopped => {
                info!(service = "admin-dashboard", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            // 错误已在任务内记录
            Exit::Failed(_) => std::process::ExitCode::FAILURE,
            Exit::Crashed(e) => {
                error!(service = "admin-dashboard", event = "task_join_error", error = %e, "server task join error");
                std::process::ExitCode::FAILURE
            }
            Exit::Shutdown => {
                info!(service = "admin-dashboard", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, server task aborted");
                std::process::ExitCode::SUCCESS
            }
        }
    })
}
