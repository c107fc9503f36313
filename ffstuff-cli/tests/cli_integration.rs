use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use tempfile::tempdir;

const MISSING_TOOL: &str = "/nonexistent/ffstuff-test/ffmpeg";

fn ffcat_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ffcat").expect("Failed to find ffcat binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FFSTUFF_LOG_DIR");
    cmd
}

fn ffautocrop_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ffautocrop").expect("Failed to find ffautocrop binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FFSTUFF_LOG_DIR");
    cmd
}

fn write_dummy(path: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, "dummy content")?;
    Ok(())
}

#[test]
fn test_ffcat_requires_an_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("only.mp4");
    write_dummy(&input)?;

    ffcat_cmd()
        .env("FFSTUFF_FFMPEG_PATH", MISSING_TOOL)
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("missing output file"));
    Ok(())
}

#[test]
fn test_ffcat_output_collision_is_rejected_before_launch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let a = dir.path().join("a.mp4");
    let b = dir.path().join("b.mp4");
    write_dummy(&a)?;
    write_dummy(&b)?;

    // A launch attempt would exit 127 with the missing tool.
    ffcat_cmd()
        .env("FFSTUFF_FFMPEG_PATH", MISSING_TOOL)
        .arg(&a)
        .arg(&b)
        .arg(&a)
        .assert()
        .code(2)
        .stderr(contains("also an input"));

    assert_eq!(std::fs::read_to_string(&a)?, "dummy content");
    Ok(())
}

#[test]
fn test_ffcat_missing_tool_exits_127() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let a = dir.path().join("a.mp4");
    let b = dir.path().join("b.mp4");
    write_dummy(&a)?;
    write_dummy(&b)?;

    ffcat_cmd()
        .env("FFSTUFF_FFMPEG_PATH", MISSING_TOOL)
        .arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(dir.path().join("out.mp4"))
        .assert()
        .code(127)
        .stderr(contains(MISSING_TOOL));
    Ok(())
}

#[test]
fn test_ffautocrop_missing_tool_exits_127() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.mkv");
    write_dummy(&input)?;

    ffautocrop_cmd()
        .env("FFSTUFF_FFMPEG_PATH", MISSING_TOOL)
        .arg(&input)
        .arg(dir.path().join("out.mkv"))
        .assert()
        .code(127)
        .stderr(contains("FFSTUFF_FFMPEG_PATH"));
    Ok(())
}

#[test]
fn test_ffautocrop_rejects_zero_chunks() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.mkv");
    write_dummy(&input)?;

    ffautocrop_cmd()
        .env("FFSTUFF_FFMPEG_PATH", MISSING_TOOL)
        .args(["--num-chunks", "0"])
        .arg(&input)
        .arg(dir.path().join("out.mkv"))
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_invalid_selection_value() {
    ffautocrop_cmd()
        .args(["--selection", "median", "in.mkv", "out.mkv"])
        .assert()
        .failure()
        .stderr(contains("invalid value 'median'"));
}

#[cfg(unix)]
mod with_stand_in_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    /// Installs an executable shell script playing the part of ffmpeg.
    fn stand_in_tool(dir: &Path, body: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    const WRITE_LAST_ARG: &str = r#"for arg in "$@"; do last="$arg"; done
printf 'media' > "$last""#;

    #[test]
    fn test_ffcat_writes_output_through_tool() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let tool = stand_in_tool(dir.path(), WRITE_LAST_ARG)?;
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        let out = dir.path().join("out.mp4");
        write_dummy(&a)?;
        write_dummy(&b)?;

        ffcat_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg(&a)
            .arg(&b)
            .arg(&out)
            .assert()
            .success()
            .stderr(contains("stream copy"));

        assert_eq!(std::fs::read_to_string(&out)?, "media");
        Ok(())
    }

    #[test]
    fn test_ffcat_passes_tool_stderr_through() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let tool = stand_in_tool(
            dir.path(),
            "echo 'a.mp4: Invalid data found when processing input' >&2\nexit 1",
        )?;
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        write_dummy(&a)?;
        write_dummy(&b)?;

        ffcat_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg(&a)
            .arg(&b)
            .arg(dir.path().join("out.mp4"))
            .assert()
            .code(1)
            .stderr(contains("a.mp4: Invalid data found when processing input"));
        Ok(())
    }

    #[test]
    fn test_ffautocrop_applies_detected_crop() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let body = format!(
            r#"case "$*" in
  *cropdetect*)
    echo '[Parsed_cropdetect_0 @ 0x1] crop=1280:704:0:8' >&2
    echo '[Parsed_cropdetect_0 @ 0x1] crop=1280:704:0:8' >&2
    ;;
  *crop=*)
    {WRITE_LAST_ARG}
    ;;
esac
exit 0"#
        );
        let tool = stand_in_tool(dir.path(), &body)?;
        let input = dir.path().join("in.mkv");
        let out = dir.path().join("out.mkv");
        write_dummy(&input)?;

        ffautocrop_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg(&input)
            .arg(&out)
            .assert()
            .success()
            .stderr(contains("crop=1280:704:0:8"));

        assert!(out.exists());
        Ok(())
    }

    #[test]
    fn test_ffautocrop_detection_failure_exits_3() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let tool = stand_in_tool(dir.path(), "exit 0")?;
        let input = dir.path().join("in.mkv");
        let out = dir.path().join("out.mkv");
        write_dummy(&input)?;

        ffautocrop_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg(&input)
            .arg(&out)
            .assert()
            .code(3)
            .stderr(contains("no crop region could be determined"));

        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let logs = dir.path().join("logs");
        let tool = stand_in_tool(dir.path(), WRITE_LAST_ARG)?;
        let a = dir.path().join("a.mp4");
        write_dummy(&a)?;

        ffcat_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg("--log-dir")
            .arg(&logs)
            .arg(&a)
            .arg(dir.path().join("out.mp4"))
            .assert()
            .success();

        let names: Vec<String> = std::fs::read_dir(&logs)?
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("ffcat_run_"));
        Ok(())
    }

    #[test]
    fn test_log_dir_from_environment() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let logs = dir.path().join("env-logs");
        let tool = stand_in_tool(dir.path(), WRITE_LAST_ARG)?;
        let a = dir.path().join("a.mp4");
        write_dummy(&a)?;

        ffcat_cmd()
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .env("FFSTUFF_LOG_DIR", &logs)
            .arg(&a)
            .arg(dir.path().join("out.mp4"))
            .assert()
            .success();

        let count = std::fs::read_dir(&logs)?.filter_map(Result::ok).count();
        assert_eq!(count, 1);
        Ok(())
    }

    fn wait_for_pid(path: &Path, timeout: Duration) -> Option<u32> {
        let started = Instant::now();
        while started.elapsed() < timeout {
            if let Ok(text) = std::fs::read_to_string(path) {
                if let Ok(pid) = text.trim().parse() {
                    return Some(pid);
                }
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        None
    }

    fn is_alive(pid: u32) -> bool {
        std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_sigterm_kills_running_tool() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let pid_file = dir.path().join("tool.pid");
        let body = format!("echo $$ > '{}'\nexec sleep 30", pid_file.display());
        let tool = stand_in_tool(dir.path(), &body)?;
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        write_dummy(&a)?;
        write_dummy(&b)?;

        let mut ffcat = std::process::Command::new(env!("CARGO_BIN_EXE_ffcat"))
            .env("NO_COLOR", "1")
            .env_remove("FFSTUFF_LOG_DIR")
            .env("FFSTUFF_FFMPEG_PATH", &tool)
            .arg(&a)
            .arg(&b)
            .arg(dir.path().join("out.mp4"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let Some(tool_pid) = wait_for_pid(&pid_file, Duration::from_secs(10)) else {
            let _ = ffcat.kill();
            panic!("stand-in tool never started");
        };
        // Let ffcat register the child it just spawned.
        std::thread::sleep(Duration::from_millis(300));
        let sent = std::process::Command::new("kill")
            .args(["-TERM", &ffcat.id().to_string()])
            .status()?;
        assert!(sent.success());

        let started = Instant::now();
        let status = loop {
            if let Some(status) = ffcat.try_wait()? {
                break status;
            }
            if started.elapsed() > Duration::from_secs(10) {
                let _ = ffcat.kill();
                panic!("ffcat did not exit after SIGTERM");
            }
            std::thread::sleep(Duration::from_millis(20));
        };

        assert_eq!(status.code(), Some(130));
        assert!(!is_alive(tool_pid), "tool process {tool_pid} outlived ffcat");
        Ok(())
    }
}
