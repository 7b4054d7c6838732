// crates/cli/src/commands.rs
//! One function per subcommand. Every flow ends in either a success line
//! or an error bubbled to main — never a silent no-op.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use morphbox_client::{poller, Client, JobFilter, PollPolicy, PollerState, Submission};
use morphbox_types::{ConversionJob, JobStatus};
use uuid::Uuid;

// ── Auth ────────────────────────────────────────────────────────────────

pub async fn login(client: &Client, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password: ")?,
    };
    let identity = client.auth.login(email, &password).await?;
    println!("Logged in as {} ({})", identity.email, role_label(&identity.role));
    Ok(())
}

pub async fn register(client: &Client, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            let first = prompt_line("Password: ")?;
            let second = prompt_line("Repeat password: ")?;
            if first != second {
                bail!("passwords do not match");
            }
            first
        }
    };
    let identity = client.auth.register(email, &password).await?;
    println!("Account created — logged in as {}", identity.email);
    Ok(())
}

pub fn logout(client: &Client) -> Result<()> {
    client.auth.logout();
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(client: &Client) -> Result<()> {
    let identity = client.auth.me().await?;
    println!("{} ({})", identity.email, role_label(&identity.role));
    Ok(())
}

pub async fn storage(client: &Client) -> Result<()> {
    let info = client.auth.storage().await?;
    println!(
        "{} of {} used ({:.1}%), {} available",
        human_bytes(info.used),
        human_bytes(info.quota),
        info.percentage,
        human_bytes(info.available),
    );
    Ok(())
}

fn role_label(role: &str) -> &str {
    if role.is_empty() {
        "user"
    } else {
        role
    }
}

// ── Formats ─────────────────────────────────────────────────────────────

pub async fn formats(client: &Client, category: Option<&str>) -> Result<()> {
    let catalog = client
        .catalog
        .fetch()
        .await
        .context("could not load the format catalog")?;

    match category {
        Some(name) => {
            let input = catalog.input_formats(name);
            let output = catalog.output_formats(name);
            if input.is_empty() && output.is_empty() {
                bail!("unknown category '{name}'");
            }
            println!("{name}");
            println!("  input:  {}", input.join(", "));
            println!("  output: {}", output.join(", "));
        }
        None => {
            for name in catalog.categories() {
                println!("{name}");
                println!("  input:  {}", catalog.input_formats(name).join(", "));
                println!("  output: {}", catalog.output_formats(name).join(", "));
            }
        }
    }
    Ok(())
}

// ── Convert ─────────────────────────────────────────────────────────────

pub async fn convert(
    client: &Client,
    file: PathBuf,
    output_format: &str,
    input_format: Option<&str>,
    category: Option<&str>,
    watch: bool,
) -> Result<()> {
    let mut submission = Submission::from_file(file);
    if let Some(from) = input_format {
        submission.input_format = from.to_lowercase();
    }
    submission.output_format = output_format.to_lowercase();

    // Advisory only — the server is the authority on format pairs, so an
    // out-of-catalog format warns and the upload still goes out.
    match client.catalog.fetch().await {
        Ok(catalog) => {
            let selected = category
                .map(str::to_string)
                .or_else(|| catalog.default_category().map(str::to_string));
            if let Some(selected) = selected {
                for warning in submission.advisory_warnings(&catalog, &selected) {
                    eprintln!("warning: {warning}");
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "format catalog unavailable, skipping advisory check")
        }
    }

    let job = client.submit.submit(&mut submission).await?;
    println!(
        "Uploaded {} ({} -> {}) — job {}",
        job.input_filename, job.input_format, job.output_format, job.id
    );

    if watch {
        watch_single_job(client, job.id).await
    } else {
        println!("Run `morphbox jobs --watch` to follow progress.");
        Ok(())
    }
}

/// Follow one job via the single-job endpoint until it settles.
async fn watch_single_job(client: &Client, id: Uuid) -> Result<()> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg:12} [{bar:30}] {pos:>3}%")
            .expect("static template")
            .progress_chars("=> "),
    );

    let job = loop {
        match client.jobs.fetch(id).await {
            Ok(job) => {
                bar.set_message(job.status.to_string());
                bar.set_position(u64::from(job.progress.min(100)));
                if job.status.is_terminal() {
                    break job;
                }
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "poll failed, retrying")
            }
            Err(e) => {
                bar.abandon();
                return Err(e.into());
            }
        }
        tokio::time::sleep(client.config().poll_interval).await;
    };
    bar.finish_and_clear();

    report_outcome(&job)
}

fn report_outcome(job: &ConversionJob) -> Result<()> {
    match job.status {
        JobStatus::Completed => {
            println!("Completed. Download with `morphbox download {}`", job.id);
            Ok(())
        }
        JobStatus::Cancelled => {
            println!("Job {} was cancelled.", job.id);
            Ok(())
        }
        JobStatus::Failed => match &job.error_message {
            Some(msg) => bail!("conversion failed: {msg}"),
            None => bail!("conversion failed"),
        },
        JobStatus::Pending | JobStatus::Processing => Ok(()),
    }
}

// ── Jobs ────────────────────────────────────────────────────────────────

pub async fn jobs(client: &Client, status: Option<JobStatus>, watch: bool) -> Result<()> {
    let filter = match status {
        Some(status) => JobFilter::Status(status),
        None => JobFilter::All,
    };

    if !watch {
        let jobs = poller::list_jobs(&client.transport, filter).await?;
        print_job_table(&jobs);
        return Ok(());
    }

    let poller = client.poller();
    let mut rx = poller.subscribe();
    poller.start(filter, PollPolicy::UntilSettled).await;

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("polling jobs…");

    let mut seen: HashMap<Uuid, (JobStatus, u8)> = HashMap::new();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = poller.jobs();
                for job in snapshot.iter() {
                    let state = (job.status, job.progress);
                    if seen.insert(job.id, state) != Some(state) {
                        spinner.println(job_line(job));
                    }
                }
                let running = snapshot.iter().filter(|j| !j.status.is_terminal()).count();
                spinner.set_message(format!(
                    "{} job(s), {running} still running",
                    snapshot.len()
                ));
                if !snapshot.is_empty() && running == 0 {
                    break;
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                // the cycle settles on its own under UntilSettled
                if poller.state().await == PollerState::Idle {
                    break;
                }
            }
        }
    }
    poller.stop().await;
    spinner.finish_and_clear();

    print_job_table(&poller.jobs());
    Ok(())
}

pub async fn show_job(client: &Client, id: Uuid) -> Result<()> {
    let job = client.jobs.fetch(id).await?;
    println!("{}", job_line(&job));
    println!("  created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(started) = job.started_at {
        println!("  started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = job.completed_at {
        println!("  completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(tool) = job.tool_used.as_deref().filter(|t| !t.is_empty()) {
        println!("  tool:      {tool}");
    }
    if let Some(msg) = &job.error_message {
        println!("  error:     {msg}");
    }
    Ok(())
}

// ── Actions ─────────────────────────────────────────────────────────────

pub async fn cancel(client: &Client, id: Uuid, yes: bool) -> Result<()> {
    // last-known status comes from the server, not a stale listing
    let job = client.jobs.fetch(id).await?;
    if job.status.is_terminal() {
        bail!("job {id} is already {}, nothing to cancel", job.status);
    }

    if !yes {
        let ok = confirm(&format!(
            "Cancel conversion of {} ({} -> {})?",
            job.input_filename, job.input_format, job.output_format
        ))?;
        if !ok {
            println!("Aborted.");
            return Ok(());
        }
    }

    client.jobs.cancel(&job).await?;
    // no optimistic status flip: the next poll reflects server truth
    println!("Cancellation requested; the job list will reflect it within one poll cycle.");
    Ok(())
}

pub async fn download(client: &Client, id: Uuid, output: Option<&Path>) -> Result<()> {
    let job = client.jobs.fetch(id).await?;
    let path = client.jobs.download(&job, output).await?;
    println!("Saved {}", path.display());
    Ok(())
}

// ── Rendering helpers ───────────────────────────────────────────────────

fn job_line(job: &ConversionJob) -> String {
    let id = job.id.to_string();
    let progress = match job.status {
        JobStatus::Processing => format!("{:>3}%", job.progress),
        _ => "   -".to_string(),
    };
    format!(
        "{}  {:<10} {}  {:<24} {} -> {}",
        &id[..8],
        job.status,
        progress,
        job.input_filename,
        job.input_format,
        job.output_format
    )
}

fn print_job_table(jobs: &[ConversionJob]) {
    if jobs.is_empty() {
        println!("No jobs found.");
        return;
    }
    println!(
        "{:<8}  {:<10} {:>4}  {:<24} {}",
        "ID", "STATUS", "PROG", "FILE", "CONVERSION"
    );
    for job in jobs {
        println!("{}", job_line(job));
    }
}

fn human_bytes(n: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(status: JobStatus, progress: u8) -> ConversionJob {
        ConversionJob {
            id: "aaaaaaaa-0000-0000-0000-000000000001".parse().unwrap(),
            input_filename: "song.mp3".into(),
            output_filename: "song.wav".into(),
            input_format: "mp3".into(),
            output_format: "wav".into(),
            status,
            progress,
            file_size: 0,
            error_message: None,
            tool_used: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            user_email: None,
        }
    }

    #[test]
    fn test_job_line_shows_progress_only_while_processing() {
        let line = job_line(&job(JobStatus::Processing, 40));
        assert!(line.contains("40%"));
        assert!(line.starts_with("aaaaaaaa"));

        let line = job_line(&job(JobStatus::Completed, 100));
        assert!(!line.contains('%'));
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2 * 1024 * 1024), "2.00 MB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_report_outcome_failure_carries_server_message() {
        let mut failed = job(JobStatus::Failed, 0);
        failed.error_message = Some("unsupported codec".into());
        let err = report_outcome(&failed).unwrap_err();
        assert!(err.to_string().contains("unsupported codec"));
        assert!(report_outcome(&job(JobStatus::Completed, 100)).is_ok());
    }
}
