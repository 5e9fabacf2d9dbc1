//! Scripted playground sessions on virtual time.
//!
//! Script format, one step per line (`#` starts a comment):
//! ```text
//! auto-run on
//! edit html <h1>Hi</h1>\n<p>there</p>
//! append js console.log(1);
//! key ctrl+s
//! key tab js:4
//! wait 500
//! run | save | load
//! clear yes
//! ```
//! Texts understand `\n`, `\t` and `\\` escapes. A key step may name the
//! focused pane as `pane` (caret at the end) or `pane:byte_offset`.

use std::io::{self, Write};

use minipen::platform::cli::TestClock;
use thiserror::Error;
use minipen::{EditorController, KeyPress, KeyValueStore, Pane, PaneFocus, PreviewSurface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AutoRun(bool),
    Edit { pane: Pane, text: String },
    Append { pane: Pane, text: String },
    Key { press: KeyPress, focus: Option<FocusSpec> },
    Wait(u64),
    Run,
    Save,
    Load,
    Clear { confirm: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSpec {
    pub pane: Pane,
    /// `None` puts the caret at the end of the pane.
    pub caret: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

pub fn parse_script(content: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let error = |message: String| ScriptError {
            line: index + 1,
            message,
        };
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let step = match command {
            "auto-run" => match rest.trim() {
                "on" => Step::AutoRun(true),
                "off" => Step::AutoRun(false),
                other => return Err(error(format!("expected 'on' or 'off', got '{other}'"))),
            },
            "edit" | "append" => {
                let (pane, text) = rest.split_once(' ').unwrap_or((rest, ""));
                let pane = parse_pane(pane).map_err(error)?;
                let text = unescape(text);
                if command == "edit" {
                    Step::Edit { pane, text }
                } else {
                    Step::Append { pane, text }
                }
            }
            "key" => {
                let mut parts = rest.split_whitespace();
                let chord = parts
                    .next()
                    .ok_or_else(|| error("missing key chord".to_owned()))?;
                let press = KeyPress::parse(chord)
                    .ok_or_else(|| error(format!("unknown key chord '{chord}'")))?;
                let focus = parts.next().map(parse_focus).transpose().map_err(error)?;
                Step::Key { press, focus }
            }
            "wait" => {
                let ms = rest
                    .trim()
                    .trim_end_matches("ms")
                    .parse()
                    .map_err(|_| error(format!("invalid duration '{}'", rest.trim())))?;
                Step::Wait(ms)
            }
            "run" => Step::Run,
            "save" => Step::Save,
            "load" => Step::Load,
            "clear" => match rest.trim() {
                "yes" | "" => Step::Clear { confirm: true },
                "no" => Step::Clear { confirm: false },
                other => return Err(error(format!("expected 'yes' or 'no', got '{other}'"))),
            },
            other => return Err(error(format!("unknown step '{other}'"))),
        };
        steps.push(step);
    }
    Ok(steps)
}

fn parse_pane(label: &str) -> Result<Pane, String> {
    Pane::from_label(label).ok_or_else(|| format!("unknown pane '{label}'"))
}

fn parse_focus(spec: &str) -> Result<FocusSpec, String> {
    let (pane, caret) = match spec.split_once(':') {
        Some((pane, caret)) => {
            let caret = caret
                .parse()
                .map_err(|_| format!("invalid caret offset '{caret}'"))?;
            (pane, Some(caret))
        }
        None => (spec, None),
    };
    Ok(FocusSpec {
        pane: parse_pane(pane)?,
        caret,
    })
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Replays `steps` and writes one transcript line per observable event
/// (notification shown, preview rendered).
pub fn run_script<S, P>(
    controller: &mut EditorController<S, P, TestClock>,
    steps: &[Step],
    out: &mut impl Write,
) -> io::Result<()>
where
    S: KeyValueStore,
    P: PreviewSurface,
{
    let mut observer = Observer::default();
    for step in steps {
        log::debug!("step {step:?}");
        match step {
            Step::AutoRun(enabled) => controller.set_auto_run(*enabled),
            Step::Edit { pane, text } => controller.input(*pane, text.clone()),
            Step::Append { pane, text } => {
                let mut content = controller.state().text(*pane).to_owned();
                content.push_str(text);
                controller.input(*pane, content);
            }
            Step::Key { press, focus } => {
                let focus = focus.map(|spec| {
                    let end = controller.state().text(spec.pane).len();
                    PaneFocus::caret(spec.pane, spec.caret.unwrap_or(end))
                });
                let outcome = controller.handle_key(press, focus);
                if let Some(caret) = outcome.caret {
                    observer.line(controller, out, &format!("caret at {caret}"))?;
                }
            }
            Step::Wait(ms) => {
                let target = controller.clock().now_ms().saturating_add(*ms);
                while let Some(job) = controller.clock_mut().pop_due(target) {
                    controller.fire(job);
                    observer.report(controller, out)?;
                }
                controller.clock_mut().set_time(target);
            }
            Step::Run => {
                let _ = controller.run();
            }
            Step::Save => {
                let _ = controller.save();
            }
            Step::Load => {
                let _ = controller.load();
            }
            Step::Clear { confirm } => {
                let answer = *confirm;
                controller.clear(&mut |_: &str| answer);
            }
        }
        observer.report(controller, out)?;
    }
    Ok(())
}

#[derive(Default)]
struct Observer {
    renders: u64,
    generation: u64,
}

impl Observer {
    fn report<S, P>(
        &mut self,
        controller: &EditorController<S, P, TestClock>,
        out: &mut impl Write,
    ) -> io::Result<()>
    where
        S: KeyValueStore,
        P: PreviewSurface,
    {
        let renders = controller.renderer().renders();
        if renders != self.renders {
            self.renders = renders;
            self.line(controller, out, &format!("render #{renders}"))?;
        }
        if let Some(notification) = controller.notification() {
            if notification.generation != self.generation {
                self.generation = notification.generation;
                let text = format!("{}: {}", notification.severity, notification.message);
                self.line(controller, out, &text)?;
            }
        }
        Ok(())
    }

    fn line<S, P>(
        &self,
        controller: &EditorController<S, P, TestClock>,
        out: &mut impl Write,
        text: &str,
    ) -> io::Result<()>
    where
        S: KeyValueStore,
        P: PreviewSurface,
    {
        writeln!(out, "[{:>6}ms] {text}", controller.clock().now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minipen::{MemoryStorage, PlaygroundConfig, RecordingSurface};

    fn transcript(script: &str) -> String {
        let steps = parse_script(script).unwrap();
        let mut controller = EditorController::new(
            MemoryStorage::new(),
            RecordingSurface::new(),
            TestClock::new(),
            PlaygroundConfig::default(),
        );
        let mut out = Vec::new();
        run_script(&mut controller, &steps, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_every_step_kind() {
        let steps = parse_script(concat!(
            "# session\n",
            "auto-run on\n",
            "edit html <p>a\\nb</p>\n",
            "append css p{}\n",
            "key tab js:2\n",
            "key ctrl+s\n",
            "wait 500ms\n",
            "run\nsave\nload\n",
            "clear no\n",
        ))
        .unwrap();
        assert_eq!(steps.len(), 10);
        assert_eq!(
            steps[1],
            Step::Edit {
                pane: Pane::Html,
                text: "<p>a\nb</p>".to_owned()
            }
        );
        assert_eq!(
            steps[3],
            Step::Key {
                press: KeyPress::new("Tab"),
                focus: Some(FocusSpec {
                    pane: Pane::Js,
                    caret: Some(2)
                }),
            }
        );
        assert_eq!(steps[5], Step::Wait(500));
        assert_eq!(steps[9], Step::Clear { confirm: false });
    }

    #[test]
    fn reports_line_numbers_of_bad_steps() {
        let error = parse_script("run\n\nedit xml <a>").unwrap_err();
        assert_eq!(error.line, 3);
        assert!(error.message.contains("xml"));
        assert!(error.to_string().starts_with("line 3: "));
        assert!(parse_script("wait soon").is_err());
        assert!(parse_script("key hyper+s").is_err());
    }

    #[test]
    fn unescapes_known_sequences_only() {
        assert_eq!(unescape(r"a\nb\tc\\d\q"), "a\nb\tc\\d\\q");
    }

    #[test]
    fn transcript_shows_deferred_renders_at_their_time() {
        let out = transcript(
            "auto-run on\nedit html <p>x</p>\nwait 100\nedit html <p>xy</p>\nwait 1000\n",
        );
        assert_eq!(
            out,
            "[     0ms] success: Auto-run enabled\n\
             [   500ms] render #1\n\
             [   500ms] success: Code executed successfully!\n\
             [   600ms] render #2\n\
             [   600ms] success: Code executed successfully!\n"
        );
    }

    #[test]
    fn transcript_of_empty_load_is_a_warning() {
        assert_eq!(transcript("load\n"), "[     0ms] warning: No saved code found\n");
    }

    #[test]
    fn waiting_until_the_end_of_time_does_not_overflow() {
        let out = transcript("wait 1\nwait 18446744073709551615\nsave\n");
        assert_eq!(out, "[18446744073709551615ms] success: Code saved successfully!\n");
    }
}
