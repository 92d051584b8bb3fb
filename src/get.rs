//! Scheme retrieval by id for `saral show`, `translate`, `simplify` and
//! `explain`.

use anyhow::Result;

use crate::config::Config;
use crate::models::SchemeFields;
use crate::portal::Portal;

/// Print one scheme, translated when `language` is not English.
pub async fn run_get(config: &Config, id: i64, language: &str) -> Result<()> {
    let portal = Portal::open(config).await?;

    let localized = match portal.localized_scheme(id, language).await? {
        Some(s) => s,
        None => {
            eprintln!("Error: scheme not found: {}", id);
            std::process::exit(1);
        }
    };

    println!("--- Scheme ---");
    println!("id:           {}", localized.scheme.id);
    println!("category:     {}", localized.scheme.category);
    if let Some(ref url) = localized.scheme.url {
        println!("url:          {}", url);
    }
    println!("language:     {}", localized.language);
    if !localized.translated {
        println!(
            "note:         translation unavailable{}, showing original text",
            if portal.limited_mode() { " (limited mode)" } else { "" }
        );
    } else if localized.cached {
        println!("note:         from translation cache");
    }
    println!();
    print_fields(&localized.fields);

    portal.close().await;
    Ok(())
}

/// Print the plain-language version of a scheme.
pub async fn run_simplify(config: &Config, id: i64) -> Result<()> {
    let portal = Portal::open(config).await?;

    let simple = match portal.simplified_scheme(id).await? {
        Some(s) => s,
        None => {
            eprintln!("Error: scheme not found: {}", id);
            std::process::exit(1);
        }
    };

    if !simple.simplified {
        println!("(simplification unavailable, showing original text)");
        println!();
    }
    print_fields(&simple.fields);

    portal.close().await;
    Ok(())
}

pub async fn run_explain(config: &Config, id: i64) -> Result<()> {
    let portal = Portal::open(config).await?;

    match portal.explain_scheme(id).await? {
        Some(text) => println!("{}", text),
        None => {
            eprintln!("Error: scheme not found: {}", id);
            std::process::exit(1);
        }
    }

    portal.close().await;
    Ok(())
}

fn print_fields(fields: &SchemeFields) {
    println!("# {}", fields.title);
    println!();
    println!("Description:");
    println!("  {}", fields.description);
    println!();
    println!("Eligibility:");
    println!("  {}", fields.eligibility);
    println!();
    println!("Benefits:");
    println!("  {}", fields.benefits);
}
