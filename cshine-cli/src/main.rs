mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use cshine::api::{ListQuery, UserProfile};
use cshine::broadcast::NoticeLevel;
use cshine::config::load_effective_config;
use cshine::pipeline::{BroadcastProgress, JobMetadata, UploadArtifact};
use cshine::playback::{format_time, waveform, MAX_HEIGHT_RATIO};
use cshine::polling::PollCallbacks;
use cshine::session::StaticLoginCode;
use cshine::{AppContext, ClientError, JobId, JobKind, JobResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit recordings to Cshine and follow their processing")]
struct Cli {
    /// Config file; falls back to $CSHINE_CONFIG, then built-in defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange a one-time login code for a session.
    Login {
        #[arg(long)]
        code: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Forget the cached session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Upload an audio file and create a flash note or meeting from it.
    Submit {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = KindArg::Meeting)]
        kind: KindArg,
        #[arg(short, long)]
        title: Option<String>,
        /// Comma separated names.
        #[arg(short, long)]
        participants: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        folder_id: Option<i64>,
        /// Audio duration in seconds.
        #[arg(long)]
        duration: Option<u32>,
        /// Return once the job is created instead of waiting for the result.
        #[arg(long)]
        no_wait: bool,
    },
    /// Poll an existing job until it finishes.
    Track {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },
    /// List flash notes or meetings.
    List {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Draw a meeting's waveform in the terminal.
    Waveform {
        id: String,
        #[arg(long, default_value_t = 60)]
        width: u16,
        /// Playback position in seconds.
        #[arg(long, default_value_t = 0.0)]
        at: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Flash,
    Meeting,
}

impl From<KindArg> for JobKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Flash => JobKind::Flash,
            KindArg::Meeting => JobKind::Meeting,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = load_effective_config(cli.config.as_deref())?;
    debug!("Using API at {}", config.api_base_url);
    let ctx = AppContext::new(config)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping");
                cancel.cancel();
            }
        });
    }

    spawn_notice_printer(&ctx);
    spawn_progress_logger(&ctx);

    run(cli.command, &ctx, &cancel).await
}

async fn run(command: Command, ctx: &AppContext, cancel: &CancellationToken) -> anyhow::Result<()> {
    match command {
        Command::Login { code, nickname } => {
            let profile = UserProfile {
                nickname,
                avatar: None,
            };
            let response = ctx
                .session()
                .login(&StaticLoginCode(code), Some(profile))
                .await?;
            println!("Logged in as {}", response.user_id);
        }
        Command::Logout => {
            ctx.session().logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = ctx.client().current_user().await?;
            println!(
                "{} {}",
                user.id,
                user.nickname.as_deref().unwrap_or("(no nickname)")
            );
        }
        Command::Submit {
            file,
            kind,
            title,
            participants,
            date,
            folder_id,
            duration,
            no_wait,
        } => {
            let kind = JobKind::from(kind);
            if kind == JobKind::Meeting && title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                bail!("Please enter a meeting title");
            }
            let artifact = UploadArtifact::from_picked_file(&file, duration)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let metadata = JobMetadata {
                title,
                participants: participants
                    .as_deref()
                    .map(JobMetadata::parse_participants)
                    .unwrap_or_default(),
                meeting_date: date,
                folder_id,
                ..JobMetadata::default()
            };

            let tracker = ctx.progress().start(kind, &artifact.file_name());
            let job = ctx
                .pipeline()
                .submit(kind, &artifact, metadata, Arc::new(BroadcastProgress::new(tracker)))
                .await?;
            println!("Created {} {}", kind, job.id);

            if !no_wait {
                let result = wait_for_result(ctx, kind, job.id, cancel).await?;
                print_result(&result)?;
            }
        }
        Command::Track { kind, id } => {
            let result = wait_for_result(ctx, kind.into(), JobId::new(id), cancel).await?;
            print_result(&result)?;
        }
        Command::List {
            kind,
            page,
            page_size,
        } => {
            let query = ListQuery {
                page: Some(page),
                page_size: Some(page_size),
                ..ListQuery::default()
            };
            match JobKind::from(kind) {
                JobKind::Flash => {
                    let flashes = ctx.client().list_flashes(&query).await?;
                    println!("{} flash notes", flashes.total);
                    for flash in flashes.items {
                        println!(
                            "{}\t{}\t{}",
                            flash.id,
                            flash.category.as_deref().unwrap_or("-"),
                            flash.title.as_deref().unwrap_or(&flash.content)
                        );
                    }
                }
                JobKind::Meeting => {
                    let meetings = ctx.client().list_meetings(&query).await?;
                    println!("{} meetings", meetings.total);
                    for meeting in meetings.items {
                        println!("{}\t{}\t{}", meeting.id, meeting.status, meeting.title);
                    }
                }
            }
        }
        Command::Waveform { id, width, at } => {
            let data = ctx.client().meeting_waveform(&JobId::new(id)).await?;
            let duration = data.duration.unwrap_or(0.0);
            print_waveform(&data.waveform, at, duration, f32::from(width));
        }
    }
    Ok(())
}

/// Polls `id` in a command-scoped registry until it settles or `cancel` fires.
async fn wait_for_result(
    ctx: &AppContext,
    kind: JobKind,
    id: JobId,
    cancel: &CancellationToken,
) -> anyhow::Result<JobResult> {
    let registry = ctx.page_registry();
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<JobResult, ClientError>>();
    let done_tx = tx.clone();

    info!("Waiting for {} {}", kind, id);
    registry.start(
        kind,
        id.clone(),
        PollCallbacks::new()
            .on_done(move |result| {
                let _ = done_tx.send(Ok(result));
            })
            .on_error(move |e| {
                let _ = tx.send(Err(e));
            }),
    );

    async {
        tokio::select! {
            _ = cancel.cancelled() => {
                registry.cancel(&id);
                bail!("cancelled while waiting for {}", id)
            }
            outcome = rx.recv() => match outcome {
                Some(Ok(result)) => Ok(result),
                Some(Err(e)) => Err(anyhow::Error::new(e)),
                None => bail!("polling for {} stopped", id),
            }
        }
    }
    .instrument(info_span!("wait", kind = %kind))
    .await
}

fn print_result(result: &JobResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&result.0)?);
    Ok(())
}

/// Rows drawn above the centre line.
const WAVEFORM_ROWS: usize = 8;

fn print_waveform(samples: &[f32], at: f64, duration: f64, width: f32) {
    let rows = waveform_rows(samples, at, duration, width);
    if rows.is_empty() {
        println!("(no waveform)");
        return;
    }
    for row in rows {
        println!("{}", row);
    }
    println!("{} / {}", format_time(at), format_time(duration));
}

/// Upper half of the waveform as text, top row first. `#` marks played bars.
fn waveform_rows(samples: &[f32], at: f64, duration: f64, width: f32) -> Vec<String> {
    let rows = WAVEFORM_ROWS as f32;
    // Sized so a full-scale bar reaches the top row.
    let height = rows * 2.0 / MAX_HEIGHT_RATIO;
    let frame = waveform::render(samples, at, duration, width, height);
    if frame.bars.is_empty() {
        return Vec::new();
    }

    (0..WAVEFORM_ROWS)
        .map(|row| {
            let threshold = rows - row as f32;
            let line: String = frame
                .bars
                .iter()
                .map(|bar| match (bar.half_height >= threshold - 0.5, bar.played) {
                    (false, _) => ' ',
                    (true, true) => '#',
                    (true, false) => '|',
                })
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

fn spawn_notice_printer(ctx: &AppContext) {
    let mut notices = ctx.notifier().subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            match notice.level {
                NoticeLevel::Error => eprintln!("error: {}", notice.message),
                NoticeLevel::Success | NoticeLevel::Info => eprintln!("{}", notice.message),
            }
        }
    });
}

fn spawn_progress_logger(ctx: &AppContext) {
    let mut events = ctx.progress().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(
                subject = %event.subject,
                phase = %event.phase,
                progress = event.progress,
                "{}",
                event.message
            );
        }
    });
}
