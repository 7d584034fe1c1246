//! 单词预测的交互式演示。
//!
//! 普通输入行按字符逐个“敲”进编辑缓冲区（经过标点辅助），每次按键后刷新候选；
//! 以 `:` 开头的行是命令，`:h` 查看列表。
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wp_core::{
    clock::ManualClock,
    config::PredictionConfig,
    context::{EditBuffer, TextContext},
    coordinator::PredictionCoordinator,
    key_event::{
        ChoiceAction, KEYSYM_BACKSPACE, KEYSYM_DELETE, KEYSYM_END, KEYSYM_HOME, KEYSYM_LEFT,
        KEYSYM_RETURN, KEYSYM_RIGHT, Key, KeyAction, KeySink,
    },
    predictor::WordPredictor,
    service::ModelClass,
};
use wp_model::{LocalConnector, MemoryModel, VocabularySpellChecker};

type Coordinator = PredictionCoordinator<LocalConnector, EditBuffer>;

/// 单词预测演示：预测、拼写纠正、自动学习。
#[derive(Parser)]
#[command(name = "wp_cli", version, about)]
struct Cli {
    /// 词表（TSV：word<TAB>count），默认使用内置词表
    #[arg(long)]
    dict: Option<PathBuf>,

    /// 配置文件（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let dict_path = cli.dict.unwrap_or_else(default_dict_path);
    let connector = LocalConnector::new(load_model(&config, &dict_path)?);
    tracing::info!(dict = %dict_path.display(), "词表已载入");

    let clock = ManualClock::new();
    let buffer = EditBuffer::new(Rc::new(clock.clone()));
    let spell_checker = VocabularySpellChecker::new(connector.model());
    let mut coordinator = PredictionCoordinator::new(
        config,
        WordPredictor::new(connector.clone()),
        buffer,
        Rc::new(clock.clone()),
    )
    .with_spell_checker(Box::new(spell_checker));

    repl(&mut coordinator, &connector, clock, &dict_path)
}

fn default_dict_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asset")
        .join("words.tsv")
}

/// 设置了 `RUST_LOG` 时以它为准，否则按 `-v` 的个数选级别。
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|s| !s.trim().is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("RUST_LOG 无效，忽略：{e}"),
        }
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn load_config(path: Option<&Path>) -> Result<PredictionConfig> {
    let Some(path) = path else {
        return Ok(PredictionConfig::default());
    };
    let s = fs::read_to_string(path)
        .with_context(|| format!("读取配置 {} 失败", path.display()))?;
    PredictionConfig::from_toml_str(&s)
        .with_context(|| format!("配置 {} 无效", path.display()))
}

/// 词表载入第一个系统模型，其余模型建成空模型。
fn load_model(config: &PredictionConfig, dict_path: &Path) -> Result<MemoryModel> {
    let Some(system) = config.system_models.first() else {
        bail!("配置里至少要有一个系统模型");
    };
    let mut model = MemoryModel::from_path(system, dict_path)
        .with_context(|| format!("载入词表 {} 失败", dict_path.display()))?;
    for name in &config.system_models {
        model = model.with_model(name.clone(), ModelClass::System);
    }
    for name in &config.user_models {
        model = model.with_model(name.clone(), ModelClass::User);
    }
    Ok(model)
}

/// REPL 命令。
#[derive(Debug, PartialEq)]
enum Command {
    /// 逐字符输入
    Type(String),
    /// 按一个功能键
    Key(&'static str),
    /// 接受预测（下标从 0 开始）
    Prediction { index: usize, allow_separator: bool },
    Correction(usize),
    Tick,
    Wait(Duration),
    Commit,
    Discard,
    Focus,
    Engine(bool),
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(input: &str) -> Command {
    let Some(rest) = input.strip_prefix(':') else {
        return Command::Type(input.to_string());
    };
    let mut it = rest.split_whitespace();
    let name = it.next().unwrap_or("");
    let arg = it.next();
    let choice = |arg: Option<&str>| {
        arg.and_then(|x| x.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
    };

    match name {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" => Command::Help,
        "tick" => Command::Tick,
        "commit" => Command::Commit,
        "discard" => Command::Discard,
        "focus" => Command::Focus,
        "online" => Command::Engine(true),
        "offline" => Command::Engine(false),
        "p" | "P" => match choice(arg) {
            Some(index) => Command::Prediction {
                index,
                allow_separator: name == "p",
            },
            None => Command::Invalid("用法：:p N（N 从 1 开始）".to_string()),
        },
        "c" => match choice(arg) {
            Some(index) => Command::Correction(index),
            None => Command::Invalid("用法：:c N（N 从 1 开始）".to_string()),
        },
        "wait" => match arg.and_then(|x| x.parse::<f64>().ok()) {
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                Command::Wait(Duration::from_secs_f64(secs))
            }
            _ => Command::Invalid("用法：:wait SECS".to_string()),
        },
        "key" => match arg.and_then(keysym) {
            Some(name) => Command::Key(name),
            None => Command::Invalid(
                "用法：:key BackSpace|Delete|Left|Right|Home|End|Return".to_string(),
            ),
        },
        other => Command::Invalid(format!("未知命令 :{other}，输入 :h 查看帮助")),
    }
}

fn keysym(name: &str) -> Option<&'static str> {
    [
        KEYSYM_BACKSPACE,
        KEYSYM_DELETE,
        KEYSYM_LEFT,
        KEYSYM_RIGHT,
        KEYSYM_HOME,
        KEYSYM_END,
        KEYSYM_RETURN,
    ]
    .into_iter()
    .find(|k| k.eq_ignore_ascii_case(name))
}

const HELP: &str = "\
直接输入文本：逐字符敲入（标点辅助生效）
:p N     接受第 N 个预测并补空格      :P N  接受第 N 个预测，不补空格
:c N     接受第 N 个拼写纠正
:key K   按功能键（BackSpace/Delete/Left/Right/Home/End/Return）
:tick    轮询一次学习调度            :wait S  拨快时钟 S 秒后轮询
:commit  立即学习全部编辑            :discard 丢弃待学习的编辑
:focus   切换到新的输入框（先提交）
:offline / :online  模拟语言模型引擎退出/恢复
:q       退出（退出前提交）";

/// 把真实流逝的时间同步到手动时钟上，`:wait` 再额外拨快。
struct ReplClock {
    clock: ManualClock,
    last: Instant,
}

impl ReplClock {
    fn sync(&mut self) {
        let now = Instant::now();
        self.clock.advance(now.duration_since(self.last));
        self.last = now;
    }
}

fn repl(
    coordinator: &mut Coordinator,
    connector: &LocalConnector,
    clock: ManualClock,
    dict_path: &Path,
) -> Result<()> {
    let mut out = io::stdout();
    let mut clock = ReplClock {
        clock,
        last: Instant::now(),
    };
    let mut line = String::new();
    writeln!(out, "word prediction demo | dict: {}", dict_path.display())?;
    writeln!(out, "输入文本后回车；:h 查看命令，:q 退出。")?;

    coordinator.on_text_entry_activated();
    print_state(&mut out, coordinator)?;

    loop {
        line.clear();
        print!("wp> ");
        out.flush()?;
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        clock.sync();
        coordinator.tick();

        let input = line.trim_end_matches(['\n', '\r']);
        if input.is_empty() {
            continue;
        }
        match parse_command(input) {
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Command::Invalid(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
            Command::Type(text) => {
                for ch in text.chars() {
                    press(coordinator, Key::Char(ch), KeyAction::Char(ch));
                }
            }
            Command::Key(name) => {
                press(coordinator, Key::Keysym(name.to_string()), KeyAction::Keysym(name));
            }
            Command::Prediction {
                index,
                allow_separator,
            } => {
                let actions = coordinator.handle(ChoiceAction::Prediction {
                    index,
                    allow_separator,
                });
                deliver(coordinator, &actions);
            }
            Command::Correction(index) => {
                let actions = coordinator.handle(ChoiceAction::Correction(index));
                deliver(coordinator, &actions);
            }
            Command::Tick => {
                let polling = coordinator.tick();
                writeln!(out, "polling: {polling}")?;
            }
            Command::Wait(by) => {
                clock.clock.advance(by);
                let polling = coordinator.tick();
                writeln!(out, "+{:.1}s, polling: {polling}", by.as_secs_f64())?;
            }
            Command::Commit => coordinator.commit_changes(),
            Command::Discard => coordinator.discard_changes(),
            Command::Focus => {
                coordinator.commit_changes();
                *coordinator.text_context_mut() = EditBuffer::new(Rc::new(clock.clock.clone()));
                coordinator.on_text_entry_activated();
            }
            Command::Engine(online) => {
                connector.set_online(online);
                writeln!(out, "engine: {}", if online { "online" } else { "offline" })?;
            }
        }
        coordinator.on_text_context_changed();
        print_state(&mut out, coordinator)?;
    }

    coordinator.on_focus_lost();
    Ok(())
}

/// 一次物理按键：生效前钩子 -> 按键本身 -> 生效后钩子。
fn press(coordinator: &mut Coordinator, key: Key, action: KeyAction) {
    let before = coordinator.on_key_before_press(&key);
    deliver(coordinator, &before);
    deliver(coordinator, &[action]);
    let after = coordinator.on_key_after_release(&key);
    deliver(coordinator, &after);
}

/// 把动作投递给编辑缓冲区并刷新候选。
fn deliver(coordinator: &mut Coordinator, actions: &[KeyAction]) {
    if actions.is_empty() {
        return;
    }
    coordinator.text_context_mut().send(actions);
    coordinator.on_text_context_changed();
}

fn print_state(out: &mut impl Write, coordinator: &Coordinator) -> io::Result<()> {
    let buffer = coordinator.text_context();
    let text: Vec<char> = buffer.text().chars().collect();
    let cursor = buffer.cursor().unwrap_or(text.len()).min(text.len());
    let before: String = text[..cursor].iter().collect();
    let after: String = text[cursor..].iter().collect();
    writeln!(out, "text: {before}|{after}")?;
    writeln!(out, "  pending spans: {}", buffer.changes().len())?;

    let choices = coordinator.choices();
    if let Some((begin, end)) = choices.correction_span {
        let line = buffer.line().unwrap_or_default();
        let word: String = line.chars().skip(begin).take(end - begin).collect();
        writeln!(out, "  corrections for `{word}`:")?;
        for (i, c) in choices.corrections.iter().enumerate() {
            writeln!(out, "    c{}. {c}", i + 1)?;
        }
    }
    if choices.predictions.is_empty() {
        writeln!(out, "  predictions: (none)")?;
    } else {
        let list: Vec<String> = choices
            .predictions
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}.{p}", i + 1))
            .collect();
        writeln!(out, "  predictions: {}", list.join("  "))?;
    }
    let unknown: Vec<&str> = choices
        .word_infos
        .iter()
        .filter(|info| !info.exact_match && !info.ignored)
        .map(|info| info.word.as_str())
        .collect();
    if !unknown.is_empty() {
        writeln!(out, "  unknown words: {}", unknown.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("hello"), Command::Type("hello".to_string()));
        assert_eq!(
            parse_command(":p 2"),
            Command::Prediction {
                index: 1,
                allow_separator: true
            }
        );
        assert_eq!(
            parse_command(":P 1"),
            Command::Prediction {
                index: 0,
                allow_separator: false
            }
        );
        assert_eq!(parse_command(":c 1"), Command::Correction(0));
        assert_eq!(parse_command(":wait 61"), Command::Wait(Duration::from_secs(61)));
        assert_eq!(parse_command(":key backspace"), Command::Key(KEYSYM_BACKSPACE));
        assert_eq!(parse_command(":q"), Command::Quit);
        assert!(matches!(parse_command(":p 0"), Command::Invalid(_)));
        assert!(matches!(parse_command(":wait -1"), Command::Invalid(_)));
        assert!(matches!(parse_command(":nope"), Command::Invalid(_)));
    }

    #[test]
    fn rust_log_overrides_verbosity() {
        assert_eq!(log_filter(0, None).to_string(), "warn");
        assert_eq!(log_filter(2, None).to_string(), "debug");
        assert_eq!(log_filter(1, Some("  ")).to_string(), "info");
        assert_eq!(log_filter(0, Some("wp_core=trace")).to_string(), "wp_core=trace");
    }

    #[test]
    fn bundled_word_list_loads() {
        let config = PredictionConfig::default();
        let model = load_model(&config, &default_dict_path()).unwrap();
        assert!(model.count("lm:system:en", "the") > 0);
    }
}
