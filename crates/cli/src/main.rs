//! Interactive terminal chat against the coaching engine.
//!
//! Commands: `/coach <id|name>` switches coach (and ends any walkthrough),
//! `/skills` lists the catalog, `/end` ends the walkthrough, `/quit` exits.
//! Everything else is sent through the engine.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use coach_config::{
    load_settings, CoachRoster, SafetyConfig, Settings, SkillCatalog, SuggestionConfig,
};
use coach_core::{CoachResponse, CoachingSession, Turn};
use coach_engine::{CoachEngine, EngineOptions, MemorySessionStore, SessionStore, TurnRequest};
use coach_llm::{LlmBackend, RelayBackend, RelayConfig};

fn relay_config(settings: &Settings) -> RelayConfig {
    RelayConfig {
        endpoint: settings.llm.endpoint.clone(),
        model: settings.llm.model.clone(),
        temperature: settings.llm.temperature,
        max_tokens: settings.llm.max_tokens,
        timeout: Duration::from_secs(settings.llm.timeout_seconds),
        max_retries: settings.llm.max_retries,
        initial_backoff: Duration::from_millis(settings.llm.initial_backoff_ms),
    }
}

fn load_catalog(settings: &Settings) -> anyhow::Result<SkillCatalog> {
    match &settings.data.skills {
        Some(path) => SkillCatalog::from_path(path).context("loading skill catalog"),
        None => SkillCatalog::load_default().context("loading embedded skill catalog"),
    }
}

fn load_roster(settings: &Settings) -> anyhow::Result<CoachRoster> {
    match &settings.data.coaches {
        Some(path) => CoachRoster::from_path(path).context("loading coach roster"),
        None => CoachRoster::load_default().context("loading embedded coach roster"),
    }
}

fn load_suggestions(settings: &Settings) -> anyhow::Result<SuggestionConfig> {
    match &settings.data.suggestions {
        Some(path) => SuggestionConfig::from_path(path).context("loading suggestion tables"),
        None => SuggestionConfig::load_default().context("loading embedded suggestion tables"),
    }
}

/// The skill an affirmative next turn should start: the skill the reply
/// just presented or brought up, else the top ranked suggestion. A mention
/// alone never starts a walkthrough; the user has to accept it first.
fn pending_skill(response: &CoachResponse) -> Option<String> {
    response
        .mentioned_skill_ids
        .first()
        .cloned()
        .or_else(|| response.suggested_skills.first().map(|s| s.skill_id.clone()))
}

fn load_safety(settings: &Settings) -> anyhow::Result<SafetyConfig> {
    match &settings.data.safety {
        Some(path) => SafetyConfig::from_path(path).context("loading safety rules"),
        None => SafetyConfig::load_default().context("loading embedded safety rules"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env = std::env::var("COACH_ENV").ok();
    let settings = load_settings(env.as_deref()).context("loading settings")?;

    let catalog = load_catalog(&settings)?;
    let roster = load_roster(&settings)?;
    let backend = Arc::new(
        RelayBackend::new(relay_config(&settings)).context("building relay backend")?,
    );
    tracing::info!(
        model = backend.model_name(),
        skills = catalog.len(),
        coaches = roster.list().len(),
        "engine ready"
    );

    let engine = CoachEngine::new(
        catalog.clone(),
        roster.clone(),
        load_suggestions(&settings)?,
        load_safety(&settings)?,
        settings.region.as_key(),
        backend,
        EngineOptions {
            history_window: settings.history_window,
            max_suggestions: settings.max_suggestions,
        },
    );
    let store = MemorySessionStore::new(settings.session_max_age_days);

    let mut coach: Option<String> = roster.list().first().map(|c| c.id.clone());
    let mut session = CoachingSession::Inactive;
    let mut last_suggested: Option<String> = None;

    println!("{}", engine.welcome(coach.as_deref()));
    println!("(/coach <id>, /skills, /end, /quit)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix("/coach ") {
            session.end();
            coach = Some(rest.trim().to_string());
            println!("{}", engine.welcome(coach.as_deref()));
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/end" => {
                session.end();
                println!("Walkthrough ended.");
                continue;
            }
            "/skills" => {
                for skill in catalog.list() {
                    println!("{:<32} {}", skill.id, skill.title);
                }
                continue;
            }
            _ => {}
        }

        // Accepting the last suggestion starts a walkthrough directly.
        if !session.is_active() && engine.is_affirmative(input) {
            if let Some(started) = last_suggested
                .take()
                .and_then(|id| engine.begin_session(&id))
            {
                session = started;
            }
        }

        let coach_key = coach.clone().unwrap_or_else(|| "coach".to_string());
        let history = store.load(&coach_key).await.unwrap_or_default();

        let response = engine
            .respond(TurnRequest {
                history: &history,
                input,
                coach: coach.as_deref(),
                session: &session,
            })
            .await;

        println!("\n{}\n", response.text);
        for suggestion in &response.suggested_skills {
            println!(
                "  suggested: {} ({:.0}%)",
                suggestion.title,
                suggestion.confidence * 100.0
            );
        }
        last_suggested = pending_skill(&response);

        session.apply(&response.coaching);
        if response.coaching.end {
            println!("  (walkthrough complete)");
        }

        let mut turns = history;
        turns.push(Turn::user(input));
        turns.push(match session.skill_id() {
            Some(skill_id) => Turn::assistant(response.text.as_str()).with_skill(skill_id),
            None => Turn::assistant(response.text.as_str()),
        });
        if let Err(error) = store.save(&coach_key, &turns).await {
            tracing::warn!(%error, "failed to persist conversation history");
        }
    }

    println!("Take care.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{ResponseSource, SkillSuggestion};

    fn suggestion(skill_id: &str) -> SkillSuggestion {
        SkillSuggestion {
            skill_id: skill_id.to_string(),
            title: skill_id.to_string(),
            confidence: 0.8,
            trigger: None,
            quote: None,
        }
    }

    #[test]
    fn test_pending_skill_prefers_presented_skill() {
        // A scripted reply lists the presented skill as mentioned but only
        // alternatives as suggestions; "yes" must start the presented one.
        let mut response =
            CoachResponse::new("walkthrough".to_string(), ResponseSource::Scripted, 1);
        response.mentioned_skill_ids = vec!["mindfulness".to_string()];
        response.suggested_skills = vec![suggestion("reframe")];

        assert_eq!(pending_skill(&response), Some("mindfulness".to_string()));
    }

    #[test]
    fn test_pending_skill_falls_back_to_top_suggestion() {
        let mut response = CoachResponse::new("reply".to_string(), ResponseSource::Llm, 2);
        response.suggested_skills = vec![suggestion("reframe"), suggestion("mindfulness")];

        assert_eq!(pending_skill(&response), Some("reframe".to_string()));
    }

    #[test]
    fn test_pending_skill_none_for_plain_replies() {
        let response = CoachResponse::new("reply".to_string(), ResponseSource::Llm, 3);
        assert_eq!(pending_skill(&response), None);
    }
}
