#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level as TraceLevel, error, info};
use tracing_subscriber::FmtSubscriber;

use fluent_panel::config::{
    AppSettings, ButtonConfig, ColorpickerConfig, DialogConfig, DropdownConfig, DropdownDefault,
    InputConfig, KeybindConfig, ParagraphConfig, SliderConfig, TabConfig, ToggleConfig,
};
use fluent_panel::gui::{Panel, run_gui};
use fluent_panel::interface::InterfaceManager;
use fluent_panel::library::Library;
use fluent_panel::notify::{LogNotifier, Notification, ToastQueue};
use fluent_panel::options::KeybindMode;
use fluent_panel::persistence::{PersistError, SaveManager};
use fluent_panel::store::{DurableStore, FileStore};

#[derive(Parser, Debug)]
#[command(name = "fluent-panel")]
#[command(about = "Control panel with named configuration slots", version)]
struct Cli {
    /// Config folder inside the store (overrides settings)
    #[arg(long, global = true)]
    folder: Option<String>,

    /// Store directory (overrides settings)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the demo panel (default)
    Gui,
    /// Inspect saved configurations
    Configs {
        #[command(subcommand)]
        action: ConfigsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigsAction {
    /// List configuration names in the folder
    List,
    /// Print a saved configuration as JSON
    Show { name: String },
    /// Delete a saved configuration
    Delete { name: String },
}

fn parse_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Settings decide the final log level; until then LOG_LEVEL applies
    let env_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let bootstrap = FmtSubscriber::builder()
        .with_max_level(parse_level(&env_level))
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, AppSettings::load);
    let log_level = match &loaded {
        Ok(settings) => settings.log_level.clone(),
        Err(_) => env_level,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let mut settings = loaded.unwrap_or_else(|err| {
        error!(error = ?err, "Failed to load settings, using defaults");
        AppSettings::default()
    });
    if let Some(folder) = cli.folder {
        settings.folder = folder;
    }
    if let Some(store_dir) = cli.store_dir {
        settings.store_dir = Some(store_dir);
    }
    settings.validate_and_clamp();

    let store_dir = settings.resolved_store_dir();
    info!(folder = %settings.folder, store_dir = ?store_dir, "Using configuration store");
    let store: Rc<dyn DurableStore> = Rc::new(FileStore::new(store_dir));

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_panel(&settings, store),
        Command::Configs { action } => run_configs(&settings, store, action),
    }
}

fn save_manager(settings: &AppSettings, library: Library, store: Rc<dyn DurableStore>) -> SaveManager {
    let manager = SaveManager::new(library, store);
    manager.set_folder(settings.folder.clone());
    manager.set_ignore_indexes(settings.ignore_indexes.iter().cloned());
    if settings.ignore_theme_settings {
        manager.ignore_theme_settings();
    }
    manager
}

fn run_configs(settings: &AppSettings, store: Rc<dyn DurableStore>, action: ConfigsAction) -> Result<()> {
    let library = Library::new();
    library.set_notifier(Rc::new(LogNotifier));
    let manager = save_manager(settings, library, store);

    match action {
        ConfigsAction::List => {
            let configs = manager.get_configs();
            if configs.is_empty() {
                println!("No configurations found in {}", manager.folder());
            }
            for name in configs {
                println!("{name}");
            }
        }
        ConfigsAction::Show { name } => match manager.record(&name) {
            Ok(record) => {
                let json = serde_json::to_string_pretty(&record)
                    .context("Failed to format configuration")?;
                println!("{json}");
            }
            Err(PersistError::NotFound(name)) => bail!("Configuration {name:?} not found"),
            Err(err) => return Err(err).context("Failed to read configuration"),
        },
        ConfigsAction::Delete { name } => {
            if !manager.get_configs().contains(&name) {
                bail!("Configuration {name:?} not found");
            }
            manager
                .delete(&name)
                .with_context(|| format!("Failed to delete configuration {name:?}"))?;
            println!("Deleted {name}");
        }
    }
    Ok(())
}

fn run_panel(settings: &AppSettings, store: Rc<dyn DurableStore>) -> Result<()> {
    let library = Library::new();
    let toasts = ToastQueue::new();
    library.set_notifier(Rc::new(toasts.clone()));

    let window = library.create_window(settings.window.clone());
    let demo = window.add_tab(TabConfig::new("Controls").icon("\u{2699}"));
    build_demo_tab(&library, &demo);

    let settings_tab = window.add_tab(TabConfig::new("Settings").icon("\u{1F4BE}"));
    let interface = InterfaceManager::new(library.clone(), Rc::clone(&store));
    interface.set_folder(settings.folder.clone());
    interface.build_interface_section(&settings_tab);
    let manager = save_manager(settings, library.clone(), store);
    manager.build_config_section(&settings_tab);

    run_gui(Panel {
        library,
        window,
        toasts,
        interface: Some(interface),
        saves: Some(manager),
    })
}

fn build_demo_tab(library: &Library, tab: &fluent_panel::library::Tab) {
    tab.add_paragraph(ParagraphConfig::new(
        "Welcome",
        "Every control below is saved with the configuration slots on the Settings tab.",
    ));

    let toggle = tab.add_toggle("AutoFarm", ToggleConfig::new("Auto Farm").description("Runs while enabled"));
    toggle.on_changed(|enabled| info!(enabled, "Auto farm toggled"));

    tab.add_slider(
        "Speed",
        SliderConfig::new("Speed", 0.0, 100.0)
            .with_default(16.0)
            .rounding(1)
            .callback(|value| info!(value, "Speed changed")),
    );

    tab.add_dropdown(
        "Mode",
        DropdownConfig::new("Mode", ["Slow", "Normal", "Fast"]).with_default(DropdownDefault::Index(2)),
    );
    tab.add_dropdown(
        "Targets",
        DropdownConfig::new("Targets", ["Trees", "Rocks", "Ore", "Fish"])
            .multi()
            .with_default(DropdownDefault::Values(vec!["Rocks".to_string()])),
    );

    tab.add_colorpicker("Colors", ColorpickerConfig::new("Highlight").transparency(0.8));

    let notify_library = library.clone();
    tab.add_keybind(
        "Boost",
        KeybindConfig::new("Boost")
            .mode(KeybindMode::Hold)
            .with_default("B")
            .callback(move |active| {
                notify_library.notify(
                    Notification::new("Boost", if active { "Boost on" } else { "Boost off" }).duration(1.0),
                );
            })
            .changed_callback(|key| info!(key, "Boost key changed")),
    );

    tab.add_input(
        "Nickname",
        InputConfig::new("Nickname")
            .placeholder("Type and press Enter")
            .finished()
            .callback(|text| info!(text, "Nickname committed")),
    );

    let dialog_tab = tab.clone();
    tab.add_button(
        ButtonConfig::new("About", move || {
            dialog_tab.dialog(
                DialogConfig::new("About", format!("fluent-panel {}", fluent_panel::library::VERSION))
                    .button("OK", || {}),
            );
        })
        .description("Show version information"),
    );
}
