//! Interactive command shell.
//!
//! Commands are looked up in [`COMMANDS`], a dispatch table of name → prompts → handler.
//! The shell asks each of a command's prompts in order, collects the answers into
//! [`Inputs`], and only then calls the handler, so handlers never read from the terminal.
//!
//! Archive failures a user can act on (unknown key, missing source, ...) are printed as one
//! line and the session carries on. Metadata log and terminal I/O failures end the session
//! with an error.

use crate::render;
use crate::{ShellError, ShellResult};
use filestash_core::constants::DEFAULT_DOWNLOAD_DIR;
use filestash_core::{ArchiveResult, ArchiveService};
use std::io::{BufRead, Write};
use std::path::Path;

/// One question asked before a command runs.
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub label: &'static str,
    /// Used when the answer is blank.
    pub default: Option<&'static str>,
}

/// Answers to a command's prompts, in prompt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs(Vec<String>);

impl Inputs {
    pub fn new(answers: Vec<String>) -> Self {
        Self(answers)
    }

    /// The answer at `index`, or `""` if fewer answers were given.
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }
}

impl<S: Into<String>> FromIterator<S> for Inputs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type Handler = fn(&ArchiveService, &Inputs, &mut dyn Write) -> ShellResult<Flow>;

pub struct CommandEntry {
    pub name: &'static str,
    pub prompts: &'static [Prompt],
    handler: Handler,
}

pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "upload",
        prompts: &[Prompt {
            label: "Enter the full path of file to upload: ",
            default: None,
        }],
        handler: upload,
    },
    CommandEntry {
        name: "download",
        prompts: &[
            Prompt {
                label: "Enter file key to download: ",
                default: None,
            },
            Prompt {
                label: "Enter folder path to save (default: ./downloads): ",
                default: Some(DEFAULT_DOWNLOAD_DIR),
            },
        ],
        handler: download,
    },
    CommandEntry {
        name: "list",
        prompts: &[],
        handler: list,
    },
    CommandEntry {
        name: "info",
        prompts: &[Prompt {
            label: "Enter key to view file info: ",
            default: None,
        }],
        handler: info,
    },
    CommandEntry {
        name: "exit",
        prompts: &[],
        handler: exit,
    },
];

pub fn command_names() -> Vec<&'static str> {
    COMMANDS.iter().map(|c| c.name).collect()
}

/// Finds `name` in the dispatch table. Matching is case-insensitive and ignores surrounding
/// whitespace.
pub fn lookup(name: &str) -> ShellResult<&'static CommandEntry> {
    let wanted = name.trim().to_lowercase();
    COMMANDS
        .iter()
        .find(|c| c.name == wanted)
        .ok_or(ShellError::InvalidCommand(wanted))
}

/// Runs the command `name` with already-collected `inputs`.
pub fn dispatch(
    service: &ArchiveService,
    name: &str,
    inputs: &Inputs,
    out: &mut dyn Write,
) -> ShellResult<Flow> {
    let command = lookup(name)?;
    (command.handler)(service, inputs, out)
}

/// Prints `result` through `on_ok`, or prints a recoverable error as one line.
fn report<T>(
    out: &mut dyn Write,
    result: ArchiveResult<T>,
    on_ok: impl FnOnce(&mut dyn Write, T) -> std::io::Result<()>,
) -> ShellResult<Flow> {
    match result {
        Ok(value) => on_ok(out, value)?,
        Err(e) if e.is_recoverable() => writeln!(out, "{e}")?,
        Err(e) => return Err(e.into()),
    }
    Ok(Flow::Continue)
}

fn upload(service: &ArchiveService, inputs: &Inputs, out: &mut dyn Write) -> ShellResult<Flow> {
    let result = service.upload(Path::new(inputs.get(0)));
    report(out, result, |out, record| render::uploaded(out, &record))
}

fn download(service: &ArchiveService, inputs: &Inputs, out: &mut dyn Write) -> ShellResult<Flow> {
    let result = service.download(inputs.get(0), download_dir(inputs));
    report(out, result, |out, dest| render::downloaded(out, &dest))
}

/// The download target directory, falling back to `./downloads` when blank.
fn download_dir(inputs: &Inputs) -> &Path {
    match inputs.get(1) {
        "" => Path::new(DEFAULT_DOWNLOAD_DIR),
        dir => Path::new(dir),
    }
}

fn list(service: &ArchiveService, _inputs: &Inputs, out: &mut dyn Write) -> ShellResult<Flow> {
    let records = service.list_all()?;
    render::record_table(out, &records)?;
    Ok(Flow::Continue)
}

fn info(service: &ArchiveService, inputs: &Inputs, out: &mut dyn Write) -> ShellResult<Flow> {
    let record = service.info(inputs.get(0))?;
    render::record_info(out, record.as_ref())?;
    Ok(Flow::Continue)
}

fn exit(_service: &ArchiveService, _inputs: &Inputs, out: &mut dyn Write) -> ShellResult<Flow> {
    writeln!(out, "{}", render::FAREWELL)?;
    Ok(Flow::Exit)
}

/// Line-oriented session over any reader and writer.
pub struct Shell<R, W> {
    service: ArchiveService,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(service: ArchiveService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs until `exit` or end of input.
    pub fn run(&mut self) -> ShellResult<()> {
        render::banner(&mut self.output, &command_names())?;

        loop {
            write!(self.output, "\n>> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return self.end_of_input();
            };
            let command = match lookup(&line) {
                Ok(command) => command,
                Err(e @ ShellError::InvalidCommand(_)) => {
                    tracing::debug!(command = %line, "invalid command");
                    writeln!(self.output, "{e}")?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(inputs) = self.collect(command.prompts)? else {
                return self.end_of_input();
            };

            if (command.handler)(&self.service, &inputs, &mut self.output)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Asks each prompt in turn. `None` if input ends part way through.
    fn collect(&mut self, prompts: &[Prompt]) -> ShellResult<Option<Inputs>> {
        let mut answers = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            write!(self.output, "{}", prompt.label)?;
            self.output.flush()?;

            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            let answer = match (answer.is_empty(), prompt.default) {
                (true, Some(default)) => default.to_owned(),
                _ => answer,
            };
            answers.push(answer);
        }
        Ok(Some(Inputs::new(answers)))
    }

    /// Next line with surrounding whitespace removed, or `None` at end of input.
    fn read_line(&mut self) -> ShellResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn end_of_input(&mut self) -> ShellResult<()> {
        writeln!(self.output)?;
        exit(&self.service, &Inputs::default(), &mut self.output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestash_core::ArchiveConfig;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn service_in(temp: &TempDir) -> ArchiveService {
        ArchiveService::open(&ArchiveConfig::from_data_dir(&temp.path().join("data"))).unwrap()
    }

    fn run_session(service: &ArchiveService, script: &str) -> String {
        let mut output = Vec::new();
        Shell::new(service.clone(), Cursor::new(script.to_owned()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn key_from(output: &str) -> String {
        let marker = "Unique Key: ";
        let start = output.find(marker).expect("no key in output") + marker.len();
        output[start..start + 8].to_owned()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("  LIST ").unwrap().name, "list");
        assert_eq!(lookup("Upload").unwrap().name, "upload");
    }

    #[test]
    fn test_lookup_unknown() {
        let err = lookup("delete").err().unwrap();
        assert!(matches!(err, ShellError::InvalidCommand(ref c) if c == "delete"));
        assert_eq!(
            err.to_string(),
            "Invalid command! Try: upload | download | list | info | exit"
        );
    }

    #[test]
    fn test_inputs_get_out_of_range() {
        let inputs: Inputs = ["only"].into_iter().collect();
        assert_eq!(inputs.get(0), "only");
        assert_eq!(inputs.get(1), "");
    }

    #[test]
    fn test_exit_command() {
        let temp = TempDir::new().unwrap();
        let output = run_session(&service_in(&temp), "exit\nlist\n");

        assert!(output.starts_with("=============================="));
        assert!(output.ends_with("Exiting... Bye!\n"));
        assert!(!output.contains("No files uploaded yet."));
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let temp = TempDir::new().unwrap();
        let output = run_session(&service_in(&temp), "list\n");

        assert!(output.contains("No files uploaded yet."));
        assert!(output.ends_with("Exiting... Bye!\n"));
    }

    #[test]
    fn test_invalid_and_blank_commands() {
        let temp = TempDir::new().unwrap();
        let output = run_session(&service_in(&temp), "\n   \nfrobnicate\nexit\n");

        assert_eq!(
            output
                .matches("Invalid command! Try: upload | download | list | info | exit")
                .count(),
            3
        );
        assert!(output.ends_with("Exiting... Bye!\n"));
    }

    #[test]
    fn test_blank_command_line_is_invalid() {
        let temp = TempDir::new().unwrap();
        let output = run_session(&service_in(&temp), "\nexit\n");

        assert!(output.contains(
            ">> Invalid command! Try: upload | download | list | info | exit\n"
        ));
    }

    #[test]
    fn test_upload_info_download_session() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);
        let source = temp.path().join("report.txt");
        fs::write(&source, "hello").unwrap();
        let out_dir = temp.path().join("out");

        let upload_output = run_session(&service, &format!("upload\n{}\nexit\n", source.display()));
        assert!(upload_output.contains("Enter the full path of file to upload: "));
        assert!(upload_output.contains("File uploaded successfully! Unique Key: "));
        let key = key_from(&upload_output);

        let output = run_session(
            &service,
            &format!("INFO\n{key}\ndownload\n{key}\n{}\nlist\nexit\n", out_dir.display()),
        );

        assert!(output.contains("File Information:"));
        assert!(output.contains("original_filename: report.txt"));
        assert!(output.contains(&format!("stored_filename: {key}_report.txt")));
        assert!(output.contains(&format!(
            "File downloaded successfully to: {}",
            out_dir.join("report.txt").display()
        )));
        assert!(output.contains(&format!("{key} | report.txt | {key}_report.txt | ")));
        assert_eq!(
            fs::read_to_string(out_dir.join("report.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_download_dir_defaults_when_blank() {
        let blank: Inputs = ["deadbeef", ""].into_iter().collect();
        let missing: Inputs = ["deadbeef"].into_iter().collect();
        let given: Inputs = ["deadbeef", "/tmp/elsewhere"].into_iter().collect();

        assert_eq!(download_dir(&blank), Path::new(DEFAULT_DOWNLOAD_DIR));
        assert_eq!(download_dir(&missing), Path::new(DEFAULT_DOWNLOAD_DIR));
        assert_eq!(download_dir(&given), Path::new("/tmp/elsewhere"));
    }

    #[test]
    fn test_download_prompt_default_fills_blank_answer() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);
        let mut output = Vec::new();
        let mut shell = Shell::new(service, Cursor::new("deadbeef\n\n"), &mut output);

        let inputs = shell.collect(lookup("download").unwrap().prompts).unwrap().unwrap();

        assert_eq!(inputs, Inputs::new(vec!["deadbeef".into(), DEFAULT_DOWNLOAD_DIR.into()]));
    }

    #[test]
    fn test_recoverable_errors_keep_session_alive() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);
        let missing = temp.path().join("missing.txt");

        let output = run_session(
            &service,
            &format!(
                "upload\n{}\ndownload\ndeadbeef\n{}\ninfo\ndeadbeef\nlist\nexit\n",
                missing.display(),
                temp.path().join("out").display()
            ),
        );

        assert!(output.contains(&format!("Source file does not exist: {}", missing.display())));
        assert!(output.contains("Invalid key: deadbeef"));
        assert!(output.contains("No file found with that key."));
        assert!(output.contains("No files uploaded yet."));
        assert!(output.ends_with("Exiting... Bye!\n"));
    }

    #[test]
    fn test_missing_stored_file_reported() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);
        let source = temp.path().join("gone.txt");
        fs::write(&source, "bye").unwrap();
        let record = service.upload(&source).unwrap();
        fs::remove_file(service.storage().directory().join(&record.stored_filename)).unwrap();

        let output = run_session(
            &service,
            &format!(
                "download\n{}\n{}\nexit\n",
                record.key,
                temp.path().join("out").display()
            ),
        );

        assert!(output.contains(&format!("File missing in storage: {}", record.stored_filename)));
    }

    #[test]
    fn test_metadata_failure_ends_session() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);
        fs::remove_file(service.metadata().path()).unwrap();

        let mut output = Vec::new();
        let result = Shell::new(service, Cursor::new("list\nexit\n"), &mut output).run();

        assert!(matches!(result, Err(ShellError::Archive(_))));
    }

    #[test]
    fn test_input_ends_mid_prompt() {
        let temp = TempDir::new().unwrap();
        let output = run_session(&service_in(&temp), "download\ndeadbeef\n");

        assert!(output.contains("Enter folder path to save (default: ./downloads): "));
        assert!(output.ends_with("Exiting... Bye!\n"));
        assert!(!output.contains("Invalid key"));
    }
}
