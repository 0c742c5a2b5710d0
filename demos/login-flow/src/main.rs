//! Login flow demo
//!
//! Plays an identity widget and a backend in memory and walks the Persona
//! coordinator through login, a rejected login, a cancelled dialog and
//! logout.

use persona_auth::mocks::{MockBackend, MockIdentityProvider};
use persona_auth::{AuthHandler, DisplayOptions, Persona, PersonaConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints every event.
struct Console;

impl AuthHandler for Console {
    fn on_verifying(&self) {
        println!("    [event] verifying");
    }

    fn on_success(&self, user: &str) {
        println!("    [event] success: {user}");
    }

    fn on_failure(&self, message: &str) {
        println!("    [event] failure: {message}");
    }

    fn on_logged_out(&self) {
        println!("    [event] logged out");
    }

    fn on_logging_out(&self) {
        println!("    [event] logging out");
    }

    fn on_cancelled(&self) {
        println!("    [event] cancelled");
    }
}

#[tokio::main]
async fn main() -> persona_auth::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "login_flow=info,persona_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Login Flow Demo: Persona coordinator ===\n");

    let backend = MockBackend::new();
    let provider = MockIdentityProvider::with_default_audience("https://demo.example").with_logout_echo();
    let config = PersonaConfig::new().with_display(
        DisplayOptions::default()
            .with_site_name("Persona Demo")
            .with_privacy_policy("https://demo.example/privacy")
            .with_terms_of_service("https://demo.example/tos"),
    );

    let persona = Persona::new(config, backend.clone(), provider.clone());
    let _console = persona.add_handler(Arc::new(Console));

    persona.init(None)?;
    println!("Initial status: {}", persona.status());
    println!("Audience: {}", persona.audience());

    // Login, verified
    println!("\n>>> login(), backend verifies alice@example.com");
    backend.will_verify("alice@example.com");
    persona.login()?;
    provider.emit_login("assertion-1");
    println!("Status while the backend works: {}", persona.status());
    persona.settled().await;
    println!(
        "Status: {}, user: {:?}",
        persona.status(),
        persona.current_user()
    );

    // Login, rejected
    println!("\n>>> login(), backend rejects the assertion");
    backend.will_reject("assertion expired");
    persona.login()?;
    provider.emit_login("assertion-2");
    persona.settled().await;
    println!(
        "Status: {}, user: {:?}",
        persona.status(),
        persona.current_user()
    );

    // Dialog dismissed
    println!("\n>>> login(), user closes the dialog");
    persona.login()?;
    provider.emit_cancel();
    println!("Status: {}", persona.status());

    // Logout, after logging in again
    println!("\n>>> login() then logout()");
    backend.will_verify("alice@example.com");
    persona.login()?;
    provider.emit_login("assertion-3");
    persona.settled().await;
    persona.logout()?;
    persona.settled().await;
    println!(
        "Status: {}, user: {:?}",
        persona.status(),
        persona.current_user()
    );

    println!(
        "\nBackend calls: {} verify, {} logout",
        backend.verify_calls().len(),
        backend.logout_calls()
    );
    tracing::info!("Demo finished");

    Ok(())
}
