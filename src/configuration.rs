use std::{
    collections::HashSet, env, fs, ops::Deref, path::Path, str::FromStr,
    sync::Arc,
};

use anyhow::Context;

use tracing::{info, warn};

use crate::{
    actions::PushActions,
    error::Error,
    provider::{PushTransport, HTTP},
    push::{Dispatcher, VapidIdentity},
    registry::{MemoryRegistry, SubscriptionStore},
    types::{PushHeader, Urgency},
};

pub const DEFAULT_FALLBACK_URL: &str = "https://jorgecastrillo.blog";
const DEFAULT_PUSH_TTL: i64 = 24 * 60 * 60;

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub actions: PushActions,
}

impl State {
    pub fn new(config: Config) -> Result<State, Error> {
        let http = HTTP::new(&config)?;
        let registry = MemoryRegistry::new();

        Ok(Self::from_parts(config, Arc::new(registry), Arc::new(http)))
    }

    pub fn from_parts(
        config: Config,
        registry: Arc<dyn SubscriptionStore>,
        transport: Arc<dyn PushTransport>,
    ) -> State {
        let dispatcher = Dispatcher::new(
            config.vapid.clone(),
            transport,
            config.push_header(),
        );
        let actions = PushActions::new(
            registry,
            dispatcher,
            config.status_code_to_delete.clone(),
        );

        Self { config, actions }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub timeout: u64,
    pub mail_to: String,
    pub vapid: Option<VapidIdentity>,
    pub fallback_url: String,
    pub push_ttl: i64,
    pub push_urgency: Urgency,
    pub status_code_to_delete: Vec<u16>,
}

impl Config {
    pub fn push_header(&self) -> PushHeader {
        PushHeader {
            ttl: self.push_ttl,
            urgency: self.push_urgency.clone(),
        }
    }
}

/// `mailto:` is assumed when the contact carries no scheme.
pub fn contact_uri(mail_to: &str) -> String {
    let mail_to = mail_to.trim();
    if mail_to.starts_with("mailto:") || mail_to.starts_with("https:") {
        return mail_to.to_owned();
    }
    format!("mailto:{}", mail_to)
}

fn parse_config_vapid_keys(
    contact: &str,
) -> Result<Option<VapidIdentity>, Error> {
    let directory = env!("CARGO_MANIFEST_DIR");
    let private_key_dir = format!("{}/cert/vapid_private.pem", directory);

    let public_key = optional_var("VAPID_PUBLIC_KEY");
    let private_key = optional_var("VAPID_PRIVATE_KEY");

    let public_key = match public_key {
        Some(key) => key,
        None => {
            warn!("VAPID_PUBLIC_KEY is not set, push delivery is disabled");
            return Ok(None);
        },
    };

    if let Some(private_key) = private_key {
        let identity =
            VapidIdentity::from_raw(&public_key, &private_key, contact)?;
        return Ok(Some(identity));
    }

    if Path::new(&private_key_dir).exists() {
        let pem = fs::read(&private_key_dir)
            .with_context(|| format!("Could not read {}", private_key_dir))?;
        let identity = VapidIdentity::from_pem(&public_key, &pem, contact)?;
        return Ok(Some(identity));
    }

    warn!("VAPID private key is not configured, push delivery is disabled");
    Ok(None)
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn get_configuration() -> Result<Config, Error> {
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let allowed_origins = split_list(&env::var("ALLOWED_ORIGINS")?);
    let static_dir = format!(
        "{}/{}",
        env!("CARGO_MANIFEST_DIR"),
        env::var("STATIC_DIRECTORY")?
    );
    let timeout = env::var("TIMEOUT")?.parse()?;
    let mail_to: String = env::var("MAIL_TO")?;

    let fallback_url = optional_var("NOTIFICATION_FALLBACK_URL")
        .unwrap_or_else(|| String::from(DEFAULT_FALLBACK_URL));

    let push_ttl = match optional_var("PUSH_TTL") {
        Some(ttl) => ttl.parse()?,
        None => DEFAULT_PUSH_TTL,
    };

    let push_urgency = match optional_var("PUSH_URGENCY") {
        Some(urgency) => Urgency::from_str(&urgency)?,
        None => Urgency::Normal,
    };

    let mut status_code_to_delete = vec![];
    let codes = optional_var("STATUS_CODE_TO_DELETE")
        .unwrap_or_else(|| String::from("404,410"));

    for code in split_list(&codes) {
        status_code_to_delete.push(code.parse::<u16>()?);
    }

    let vapid = parse_config_vapid_keys(&contact_uri(&mail_to))?;

    if let Some(identity) = &vapid {
        info!("VAPID identity loaded for {}", identity.contact());
    }

    let config = Config {
        server_host,
        port,
        allowed_origins,
        static_dir,
        timeout,
        mail_to,
        vapid,
        fallback_url,
        push_ttl,
        push_urgency,
        status_code_to_delete,
    };

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let push_config_file: &str = "push.conf";

    let directory = env!("CARGO_MANIFEST_DIR");

    // the process environment wins over both files
    let preset: HashSet<String> = env::vars_os()
        .filter_map(|(key, _)| key.into_string().ok())
        .collect();

    for file in [push_config_file, config_file] {
        let path = format!("{}/{}", directory, file);
        if !Path::new(&path).exists() {
            continue;
        }

        let config_string = fs::read_to_string(path)?;
        let params = parse_config_string(&config_string);
        for (key, value) in unset_params(params, &preset) {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn unset_params(
    params: Vec<(String, String)>,
    preset: &HashSet<String>,
) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter(|(key, _)| !preset.contains(key))
        .collect()
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_at(line.find('=')?);
            Some((key.trim().to_owned(), value[1..].trim().to_owned()))
        })
        .collect()
}
