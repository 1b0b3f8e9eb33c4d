use anyhow::{Context, Result};
use indicatif::{ProgressBar as IndicatifProgressBar, ProgressStyle};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};

/// Runner for executing LLM CLI commands directly
#[derive(Debug, Default)]
pub struct ScriptRunner {
    show_progress: bool,
}

impl ScriptRunner {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// Run `command_name` with `args`, pipe `prompt` to stdin and collect stdout
    ///
    /// Fails with the captured stderr when the command exits non-zero.
    pub async fn run(&self, command_name: &str, args: &[String], prompt: &str) -> Result<String> {
        let mut cmd = Command::new(command_name);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let progress = if self.show_progress {
            let pb = IndicatifProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")?
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.set_message(format!("Running {}...", command_name));
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "Command '{}' not found. Please ensure it is installed and in your PATH.",
                command_name
            )
        })?;

        // Feed stdin from its own task so a child that writes before it has
        // read the whole prompt cannot block on a full stdout pipe
        let stdin = child.stdin.take().context("Failed to capture stdin")?;
        let writer = tokio::spawn(write_prompt(stdin, prompt.to_string()));

        // Stream stdout and stderr concurrently to avoid backpressure deadlock
        let stdout = child.stdout.take().context("Failed to capture stdout")?;
        let stderr = child.stderr.take().context("Failed to capture stderr")?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let mut output = String::new();
        let mut stderr_output = String::new();
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !stdout_done || !stderr_done {
            tokio::select! {
                line = stdout_reader.next_line(), if !stdout_done => {
                    match line {
                        Ok(Some(line)) => {
                            if let Some(ref pb) = progress {
                                let short_line = if line.chars().count() > 60 {
                                    let truncated: String = line.chars().take(60).collect();
                                    format!("{}...", truncated)
                                } else {
                                    line.clone()
                                };
                                pb.set_message(short_line);
                            }
                            output.push_str(&line);
                            output.push('\n');
                        }
                        Ok(None) => stdout_done = true,
                        Err(e) => return Err(anyhow::anyhow!("Failed to read stdout: {}", e)),
                    }
                }
                line = stderr_reader.next_line(), if !stderr_done => {
                    match line {
                        Ok(Some(line)) => {
                            tracing::debug!(command = %command_name, "{}", line);
                            stderr_output.push_str(&line);
                            stderr_output.push('\n');
                        }
                        Ok(None) => stderr_done = true,
                        Err(e) => return Err(anyhow::anyhow!("Failed to read stderr: {}", e)),
                    }
                }
            }
        }

        let status = child.wait().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if !status.success() {
            anyhow::bail!(
                "Command '{}' failed with exit code {:?}\nStderr: {}",
                command_name,
                status.code(),
                stderr_output
            );
        }

        match writer.await.context("Stdin writer task failed")? {
            Ok(()) => {}
            // The command finished cleanly without reading all of its input
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(command = %command_name, "Command closed stdin early");
            }
            Err(e) => return Err(e).context("Failed to write to stdin"),
        }

        Ok(output)
    }
}

async fn write_prompt(mut stdin: ChildStdin, prompt: String) -> std::io::Result<()> {
    stdin.write_all(prompt.as_bytes()).await?;
    stdin.flush().await?;
    // Dropping the handle closes the pipe and signals EOF
    drop(stdin);
    Ok(())
}
