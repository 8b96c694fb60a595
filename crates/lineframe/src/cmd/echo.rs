use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use lineframe_channel::{Channel, Step};
use lineframe_codec::Message;
use lineframe_transport::{stdio, LineConfig, Sink, Source};

use crate::cmd::EchoArgs;
use crate::exit::{channel_error, CliError, CliResult, SUCCESS};

pub fn run(args: EchoArgs, line_config: LineConfig) -> CliResult<i32> {
    let (source, sink) = stdio(line_config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let echoed = echo_loop(source, sink, args.count, &running)?;
    tracing::info!(echoed, "echo finished");
    Ok(SUCCESS)
}

fn echo_loop<S: Source, K: Sink>(
    source: S,
    sink: K,
    count: Option<usize>,
    running: &AtomicBool,
) -> CliResult<usize> {
    let mut channel = Channel::new(source, sink);

    let (tx, rx) = mpsc::channel::<Message>();
    channel.on_message(move |message| {
        let _ = tx.send(message.clone());
    });
    channel
        .start()
        .map_err(|err| channel_error("start failed", err))?;

    let mut echoed = 0usize;
    while running.load(Ordering::SeqCst) {
        let step = channel
            .poll()
            .map_err(|err| channel_error("receive failed", err))?;

        for message in rx.try_iter() {
            tracing::info!(
                kind = message.kind(),
                size = message.len(),
                "echoing message"
            );
            channel
                .send(&message)
                .map_err(|err| channel_error("echo send failed", err))?;
            echoed += 1;

            if count.is_some_and(|limit| echoed >= limit) {
                channel.stop();
                return Ok(echoed);
            }
        }

        if step == Step::EndOfStream {
            break;
        }
    }

    channel.stop();
    Ok(echoed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
