//! List the caption style catalog.

use storyreel_captions::{all_styles, styles_in, AnimationStyleMeta, StyleCategory};

pub fn run(category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let styles: Vec<&AnimationStyleMeta> = match category {
        Some(name) => {
            let category = StyleCategory::parse(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown category '{name}' (expected basic, styled, word or effect)")
            })?;
            styles_in(category)
        }
        None => all_styles().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&styles)?);
        return Ok(());
    }

    for category in StyleCategory::ALL {
        let group: Vec<_> = styles.iter().filter(|s| s.category == category).collect();
        if group.is_empty() {
            continue;
        }
        println!("{} ({:?} strategy):", category.as_str(), category.strategy());
        for style in group {
            println!(
                "  {:<16} {}{}",
                style.id,
                style.description,
                if style.requires_word_timing { " [word timing]" } else { "" }
            );
        }
        println!();
    }
    println!("{} style(s)", styles.len());

    Ok(())
}
