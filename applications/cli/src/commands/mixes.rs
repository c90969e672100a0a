//! Account and remote Mix commands

use crate::commands::play::{play_playlist, PlayOptions, SessionSummary};
use crate::config::{FlowConfig, ServerSettings};
use crate::error::{AppError, Result};
use flow_core::{FlowKey, MediaEntry, MediaKind};
use flow_playback::PlaylistEntry;
use flow_server_client::{FlowServerClient, Mix, MixClientHandle, ServerConfig};
use flow_storage::CatalogStore;
use std::io::{ErrorKind, Write};
use tracing::{info, warn};

/// Token from configuration, else from the token file
pub async fn read_token(settings: &ServerSettings) -> Result<Option<String>> {
    if let Some(token) = settings.token.as_deref().map(str::trim) {
        if !token.is_empty() {
            return Ok(Some(token.to_string()));
        }
    }

    match tokio::fs::read_to_string(&settings.token_file).await {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Client for the configured server, carrying the stored token if any
pub async fn connect(settings: &ServerSettings) -> Result<FlowServerClient> {
    let config = ServerConfig {
        url: settings.url.clone(),
        access_token: read_token(settings).await?,
    };
    Ok(FlowServerClient::new(config)?)
}

async fn mix_handle(settings: &ServerSettings) -> Result<MixClientHandle> {
    Ok(connect(settings).await?.mixes().await?)
}

/// Log in and keep the token for later commands
pub async fn login(
    settings: &ServerSettings,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<()> {
    let client = FlowServerClient::new(ServerConfig::new(settings.url.clone()))?;
    let token = client.login(email, password).await?;

    tokio::fs::write(&settings.token_file, &token.access_token).await?;
    info!(token_file = %settings.token_file.display(), "Access token stored");

    writeln!(out, "Logged in as {}", email)?;
    Ok(())
}

/// Create an account
pub async fn register(
    settings: &ServerSettings,
    name: &str,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<()> {
    let client = FlowServerClient::new(ServerConfig::new(settings.url.clone()))?;
    let user = client.register(name, email, password).await?;

    writeln!(
        out,
        "Registered {} <{}>. Log in with `flowplayer login`.",
        user.name, user.email
    )?;
    Ok(())
}

/// Forget the stored token
pub async fn logout(settings: &ServerSettings, out: &mut impl Write) -> Result<()> {
    match tokio::fs::remove_file(&settings.token_file).await {
        Ok(()) => writeln!(out, "Logged out")?,
        Err(e) if e.kind() == ErrorKind::NotFound => writeln!(out, "Not logged in")?,
        Err(e) => return Err(e.into()),
    }
    if settings.token.is_some() {
        writeln!(out, "A token is still set in the configuration (server.token)")?;
    }
    Ok(())
}

pub async fn list(settings: &ServerSettings, out: &mut impl Write) -> Result<Vec<Mix>> {
    let handle = mix_handle(settings).await?;
    let mixes = handle.client().list_mixes().await?;

    if mixes.is_empty() {
        writeln!(out, "No mixes yet")?;
    }
    for mix in &mixes {
        writeln!(
            out,
            "{:>5}  {:<6} {} ({} items)",
            mix.id,
            mix.flow.as_str(),
            mix.name,
            mix.items.len()
        )?;
        for item in &mix.items {
            writeln!(out, "         {:>5}  {} ({})", item.id, item.title, item.kind)?;
        }
    }

    Ok(mixes)
}

pub async fn create(
    settings: &ServerSettings,
    name: &str,
    flow: FlowKey,
    out: &mut impl Write,
) -> Result<Mix> {
    let handle = mix_handle(settings).await?;
    let mix = handle.client().create_mix(name, flow).await?;
    writeln!(out, "Created mix {}: {} ({})", mix.id, mix.name, mix.flow.label())?;
    Ok(mix)
}

/// Rename and/or retag a Mix, keeping whatever is not given
pub async fn rename(
    settings: &ServerSettings,
    id: i64,
    name: Option<&str>,
    flow: Option<FlowKey>,
    out: &mut impl Write,
) -> Result<Mix> {
    let handle = mix_handle(settings).await?;
    let client = handle.client();

    let (name, flow) = match (name, flow) {
        (Some(name), Some(flow)) => (name.to_string(), flow),
        (name, flow) => {
            let current = find_mix(client.list_mixes().await?, id)?;
            (
                name.map_or(current.name, str::to_string),
                flow.unwrap_or(current.flow),
            )
        }
    };

    let mix = client.update_mix(id, &name, flow).await?;
    writeln!(out, "Updated mix {}: {} ({})", mix.id, mix.name, mix.flow.label())?;
    Ok(mix)
}

pub async fn delete(settings: &ServerSettings, id: i64, out: &mut impl Write) -> Result<()> {
    let handle = mix_handle(settings).await?;
    handle.client().delete_mix(id).await?;
    writeln!(out, "Deleted mix {}", id)?;
    Ok(())
}

pub async fn add_item(
    settings: &ServerSettings,
    mix_id: i64,
    title: &str,
    kind: MediaKind,
    out: &mut impl Write,
) -> Result<()> {
    let handle = mix_handle(settings).await?;
    let item = handle.client().add_item(mix_id, title, kind).await?;
    writeln!(out, "Added {} ({}) to mix {} as item {}", item.title, item.kind, mix_id, item.id)?;
    Ok(())
}

pub async fn remove_item(
    settings: &ServerSettings,
    mix_id: i64,
    item_id: i64,
    out: &mut impl Write,
) -> Result<()> {
    let handle = mix_handle(settings).await?;
    handle.client().remove_item(mix_id, item_id).await?;
    writeln!(out, "Removed item {} from mix {}", item_id, mix_id)?;
    Ok(())
}

/// Play a Mix from the titles it shares with the local catalog
pub async fn play(
    config: &FlowConfig,
    id: i64,
    options: &PlayOptions,
    out: &mut impl Write,
) -> Result<Option<SessionSummary>> {
    let handle = mix_handle(&config.server).await?;
    let mix = find_mix(handle.client().list_mixes().await?, id)?;

    let catalog = match CatalogStore::open(&config.storage.database_url).await {
        Ok(store) => store.query_by_kind(None).await,
        Err(e) => Err(e),
    }
    .unwrap_or_else(|e| {
        warn!(error = %e, "Could not read the catalog, opening an empty playlist");
        Vec::new()
    });

    let (playlist, missing) = resolve_mix(&mix, &catalog);
    for title in &missing {
        writeln!(out, "Not in the local catalog: {}", title)?;
    }

    if playlist.is_empty() {
        writeln!(out, "Nothing in mix {} is available locally", mix.name)?;
        return Ok(None);
    }

    writeln!(out, "Playing mix {} ({} entries)", mix.name, playlist.len())?;
    play_playlist(config, playlist, options, out).await.map(Some)
}

/// Match a Mix's items to catalog entries by title and kind, in Mix order
///
/// Returns the playable entries and the titles with no match. When several
/// catalog entries share a title the first one (newest) wins.
pub fn resolve_mix(mix: &Mix, catalog: &[MediaEntry]) -> (Vec<PlaylistEntry>, Vec<String>) {
    let mut playlist = Vec::new();
    let mut missing = Vec::new();

    for item in &mix.items {
        match catalog
            .iter()
            .find(|entry| entry.kind == item.kind && entry.title == item.title)
        {
            Some(entry) => {
                let mut entry = PlaylistEntry::from(entry);
                // Mix membership decides the theme of the session
                entry.flow = mix.flow;
                playlist.push(entry);
            }
            None => missing.push(item.title.clone()),
        }
    }

    (playlist, missing)
}

fn find_mix(mixes: Vec<Mix>, id: i64) -> Result<Mix> {
    mixes
        .into_iter()
        .find(|mix| mix.id == id)
        .ok_or_else(|| AppError::NotFound(format!("mix {}", id)))
}
