use std::fs::OpenOptions;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rusty_money::iso;
use url::Url;

use crate::settings::{default_config_path, Settings, DEFAULT_API_URL, DEFAULT_CURRENCY};

/// Builds settings from the three prompted answers; blank answers keep the
/// defaults.
fn to_settings(api_url: &str, user_id: &str, currency: &str) -> Result<Settings> {
    let api_url = match api_url.trim() {
        "" => DEFAULT_API_URL.to_string(),
        url => {
            Url::parse(url).map_err(|e| anyhow!("API URL {:?} is invalid: {}", url, e))?;
            url.to_string()
        }
    };

    let user_id = match user_id.trim() {
        "" => 1,
        id => id
            .parse()
            .map_err(|_| anyhow!("user ID must be a number, got {:?}", id))?,
    };

    let currency = match currency.trim() {
        "" => DEFAULT_CURRENCY.to_string(),
        code => {
            let code = code.to_uppercase();
            if iso::find(&code).is_none() {
                return Err(anyhow!("currency must be an ISO 4217 code, got {:?}", code));
            }
            code
        }
    };

    Ok(Settings {
        api_url,
        user_id,
        currency,
    })
}

fn prompt<R: BufRead>(input: &mut R, question: &str) -> Result<String> {
    print!("{}", question);
    stdout().flush()?;

    let mut buf = String::new();
    input.read_line(&mut buf)?;
    Ok(buf.trim_end().to_string())
}

fn write_config(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut fd = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    write!(fd, "{}", toml::to_string_pretty(settings)?)?;

    Ok(())
}

pub(crate) async fn run(conf_path: Option<&str>) -> Result<()> {
    let path = PathBuf::from(conf_path.map_or_else(default_config_path, str::to_string));

    let stdin = stdin();
    let mut input = stdin.lock();
    let api_url = prompt(&mut input, &format!("API URL [{}]: ", DEFAULT_API_URL))?;
    let user_id = prompt(&mut input, "User ID [1]: ")?;
    let currency = prompt(&mut input, &format!("Currency [{}]: ", DEFAULT_CURRENCY))?;

    let settings = to_settings(&api_url, &user_id, &currency)?;
    write_config(&path, &settings)?;
    println!("Wrote configuration to {}.", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_keep_defaults() {
        assert_eq!(to_settings("", "", "").unwrap(), Settings::default());
    }

    #[test]
    fn answers_are_validated() {
        let settings = to_settings("http://10.0.0.2:8080", "7", "usd").unwrap();
        assert_eq!(settings.api_url, "http://10.0.0.2:8080");
        assert_eq!(settings.user_id, 7);
        assert_eq!(settings.currency, "USD");

        assert!(to_settings("localhost 8080", "", "").is_err());
        assert!(to_settings("", "bruno", "").is_err());
        assert!(to_settings("", "", "reais").is_err());
    }

    #[test]
    fn written_config_reads_back() {
        let path = std::env::temp_dir()
            .join(format!("finpal-init-{}", std::process::id()))
            .join("config.toml");
        let settings = to_settings("http://finance.local", "3", "EUR").unwrap();

        write_config(&path, &settings).unwrap();
        let read = Settings::new(Some(path.to_str().unwrap())).unwrap();
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

        assert_eq!(read, settings);
    }
}
