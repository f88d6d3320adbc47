//! fm-host - 主机端文件管理器演示程序
//!
//! 把一个主机目录作为扁平根目录，通过标准输入/输出提供文件管理命令:
//! - 每行一条命令 (格式见 `command::dispatcher`)
//! - 应答按 `TextResponder` 的行格式写到标准输出
//! - 后台线程周期性执行空闲淘汰
//!
//! ```text
//! RUST_LOG=rustfm=debug fm-host ./store
//! ```

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use embassy_futures::block_on;
use rustfm::{
    Base64Codec, Dispatcher, HostVolume, SharedDispatcher, SystemClock, TextResponder,
};
use rustfm::{log_error, log_info};

/// 空闲淘汰检查间隔
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// 标准输出适配为 `core::fmt::Write`
struct StdoutWriter<W: Write>(W);

impl<W: Write> core::fmt::Write for StdoutWriter<W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

type HostDispatcher = SharedDispatcher<HostVolume, SystemClock, Base64Codec>;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    log_info!("{} {} serving {}", rustfm::NAME, rustfm::VERSION, root);

    let shared: Arc<HostDispatcher> = Arc::new(SharedDispatcher::new(Dispatcher::new(
        HostVolume::new(&root),
        SystemClock,
    )));
    let running = Arc::new(AtomicBool::new(true));

    let ticker = {
        let shared = Arc::clone(&shared);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                if block_on(shared.tick()) {
                    log_info!("idle file handle closed");
                }
                thread::sleep(TICK_INTERVAL);
            }
        })
    };

    let stdin = io::stdin();
    let mut responder = TextResponder::new(StdoutWriter(io::stdout()));
    for line in stdin.lock().lines() {
        let line = line?;
        let command = line.trim_end_matches('\r');
        if command.is_empty() {
            continue;
        }
        block_on(shared.dispatch(command, &mut responder));
        if let Err(e) = responder.get_mut().0.flush() {
            log_error!("stdout: {}", e);
            break;
        }
    }

    running.store(false, Ordering::Release);
    if ticker.join().is_err() {
        log_error!("tick thread panicked");
    }
    log_info!("bye");
    Ok(())
}
