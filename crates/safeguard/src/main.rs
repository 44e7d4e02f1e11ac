//! `safeguard` - CLI for emergency profiles
//!
//! Owners manage their profile with `safeguard profile ...`; anyone can open
//! a public page with `safeguard view SEGMENT`.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use clap::Parser;
use tracing::warn;

use safeguard::cli::{Cli, Command, ConfigCommand, ProfileCommand, ViewCommand};
use safeguard::public::{safety_message, PublicProfile};
use safeguard::store::OfflineStore;
use safeguard::{
    init_logging, Config, Dashboard, EmergencyProfile, FixedIdentity, LocalCache, ProfileStore,
    PublicProfileView, PublicResolver, SqliteProfileStore, TieredLookup, User, ViewState,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Profile(profile_cmd) => handle_profile(&config, profile_cmd).await,
        Command::View(view_cmd) => handle_view(&config, &view_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the store and cache. Neither failure is fatal: an unopenable store
/// is replaced by an offline one, an unopenable cache by an in-memory one.
fn open_lookup(config: &Config) -> Result<TieredLookup, Box<dyn std::error::Error>> {
    let store: Arc<dyn ProfileStore> = match SqliteProfileStore::open(config.database_path()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Profile store unavailable, continuing offline");
            Arc::new(OfflineStore::new(e.to_string()))
        }
    };

    let cache = match LocalCache::open(config.cache_path()) {
        Ok(cache) => cache,
        Err(e) => {
            warn!(error = %e, "Local cache unavailable, using a temporary one");
            LocalCache::open_in_memory()?
        }
    };

    Ok(TieredLookup::new(store, Arc::new(cache)))
}

async fn handle_profile(config: &Config, cmd: ProfileCommand) -> CliResult {
    let owner = cmd.owner();
    let auth = FixedIdentity::signed_in(User::new(
        owner.user.clone(),
        owner.email.clone().unwrap_or_default(),
    ));

    let mut dashboard = Dashboard::mount(open_lookup(config)?, &auth, config.public.slug_length);
    dashboard.load_profile().await?;

    let result = run_profile_command(config, &mut dashboard, cmd).await;
    dashboard.unmount();
    result
}

async fn run_profile_command(
    config: &Config,
    dashboard: &mut Dashboard,
    cmd: ProfileCommand,
) -> CliResult {
    let base_url = &config.public.base_url;

    match cmd {
        ProfileCommand::Show { json, .. } => match dashboard.profile() {
            Some(profile) if json => println!("{}", serde_json::to_string_pretty(profile)?),
            Some(profile) => print_owner_summary(profile, base_url),
            None => println!("No profile yet. Create one with `safeguard profile save`."),
        },
        ProfileCommand::Save { file, .. } => {
            let draft = std::fs::read_to_string(&file)?;
            let details = serde_json::from_str(&draft)?;
            let outcome = dashboard.save_profile(details).await?;
            println!("Profile {outcome}.");
            if let Some(url) = dashboard.share_url(base_url) {
                println!("Share URL: {url}");
            }
        }
        ProfileCommand::Url { owner } => match dashboard.share_url(base_url) {
            Some(url) => println!("{url}"),
            None => {
                let err = safeguard::Error::not_found(format!("profile of user {}", owner.user));
                return Err(err.into());
            }
        },
        ProfileCommand::Privacy { flags, .. } => {
            if !flags.is_empty() {
                let outcome = dashboard.update_privacy(|privacy| flags.apply(privacy)).await?;
                println!("Privacy settings {outcome}.");
            }
            match dashboard.profile() {
                Some(profile) => print_privacy(profile),
                None => println!("No profile yet."),
            }
        }
        ProfileCommand::Delete { .. } => {
            if dashboard.delete_profile().await? {
                println!("Profile deleted.");
            } else {
                println!("No profile to delete.");
            }
        }
    }
    Ok(())
}

fn print_owner_summary(profile: &EmergencyProfile, base_url: &str) {
    let details = &profile.details;
    println!("{}", details.full_name);
    println!("{}", "=".repeat(details.full_name.chars().count().max(8)));
    println!("Last updated:       {}", profile.updated_at);
    println!("Blood group:        {}", details.blood_group);
    println!("Emergency contacts: {}", details.emergency_contacts.len());
    println!(
        "Organ donor:        {}",
        if details.is_organ_donor { "Yes" } else { "No" }
    );
    println!("Share URL:          {}", profile.share_url(base_url));
    println!();
    print_privacy(profile);
}

fn print_privacy(profile: &EmergencyProfile) {
    let privacy = profile.details.privacy;
    println!("[Public page shows]");
    println!("  Doctor info:    {}", privacy.show_doctor_info);
    println!("  Insurance:      {}", privacy.show_insurance);
    println!("  Exact location: {}", privacy.show_exact_location);
    println!("  Disabilities:   {}", privacy.show_disabilities);
}

async fn handle_view(config: &Config, cmd: &ViewCommand) -> CliResult {
    let mut view = PublicProfileView::new(PublicResolver::new(open_lookup(config)?));
    let state = view.open(cmd.segment.as_deref()).await;
    let today = chrono::Local::now().date_naive();
    let numbers = &config.public.emergency_numbers;

    if cmd.json {
        let body = match state {
            ViewState::Found(profile) => serde_json::to_value(PublicProfile::project(profile, today))?,
            _ => serde_json::json!({
                "status": "not_found",
                "message": safety_message(numbers),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", state.render(today, numbers));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:     {}", config.database_path().display());
                println!("  Cache path:        {}", config.cache_path().display());
                println!();
                println!("[Public]");
                println!("  Base URL:          {}", config.public.base_url);
                println!("  Slug length:       {}", config.public.slug_length);
                println!(
                    "  Emergency numbers: {}",
                    config.public.emergency_numbers.join(", ")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
