//! CLI handlers for linking, status and unlinking.

use std::io::Write;

use reqwest::Url;

use crate::flow::{AuthorizationFlow, CallbackParams, FlowStep};

/// Handle `newstler link`.
pub async fn handle_link(
    flow: &AuthorizationFlow,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = crate::auth::MemorySessionStore::new();

    let authorization_url = match flow.start(user_id, &session).await? {
        FlowStep::Linked => {
            println!("✅ LinkedIn account already linked for {user_id}");
            return Ok(());
        }
        FlowStep::Authorize { authorization_url } => authorization_url,
    };

    println!("🔗 Visit: {authorization_url}");
    println!("📋 After authorizing, paste the URL you were redirected to:");
    print!("> ");
    std::io::stdout().flush()?;

    let mut response = String::new();
    std::io::stdin().read_line(&mut response)?;
    let response = response.trim();

    if response.is_empty() {
        eprintln!("❌ No redirect URL provided.");
        std::process::exit(1);
    }

    let params = parse_callback_input(response);
    match flow.complete(user_id, &session, &params).await {
        Ok(credential) => {
            let expires = credential
                .expires_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("✅ LinkedIn account linked (token expires {expires})");
            Ok(())
        }
        Err(err) => {
            super::report_failure(&err);
            std::process::exit(1);
        }
    }
}

/// Handle `newstler status`.
pub fn handle_status(
    flow: &AuthorizationFlow,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔐 LinkedIn link status for {user_id}\n");
    match flow.credential(user_id)? {
        Some(credential) if credential.is_linked() => {
            let status = match credential.expires_at {
                Some(expires) if expires > chrono::Utc::now() => format!(
                    "✅ Linked (token expires {})",
                    expires.format("%Y-%m-%d %H:%M")
                ),
                Some(_) => "⚠️  Linked, token past its expiry".to_string(),
                None => "✅ Linked".to_string(),
            };
            println!("  {status}");
        }
        _ => println!("  ❌ Not linked"),
    }
    Ok(())
}

/// Handle `newstler unlink`.
pub fn handle_unlink(
    flow: &AuthorizationFlow,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    flow.unlink(user_id)?;
    println!("✅ LinkedIn account unlinked for {user_id}");
    Ok(())
}

/// Accept a full redirect URL or a bare `code#state` pair.
fn parse_callback_input(input: &str) -> CallbackParams {
    if let Ok(url) = Url::parse(input) {
        return CallbackParams::from_redirect_url(&url);
    }
    let (code, state) = match input.split_once('#') {
        Some((code, state)) => (code, Some(state)),
        None => (input, None),
    };
    CallbackParams {
        code: Some(code.to_string()),
        state: state.map(str::to_string),
        error: None,
    }
}
