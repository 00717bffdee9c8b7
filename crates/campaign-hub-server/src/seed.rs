// crates/campaign-hub-server/src/seed.rs
// ============================================================================
// Module: Content Seeding
// Description: Default published articles inserted on first boot.
// Purpose: Give a fresh deployment a non-empty news section.
// Dependencies: campaign-hub-core
// ============================================================================

//! ## Overview
//! A fresh database starts with a small set of published articles so the
//! public news endpoints return content before an admin logs in. Seeding is
//! idempotent: slugs already present are skipped.

use campaign_hub_core::ArticleDraft;
use campaign_hub_core::ArticleStatus;

/// Returns the default seed articles for a fresh deployment.
#[must_use]
pub fn default_articles() -> Vec<ArticleDraft> {
    vec![
        ArticleDraft {
            title: "Campaign Launch: A New Chapter for Our Community".to_string(),
            slug: Some("campaign-launch".to_string()),
            excerpt: Some(
                "The campaign officially opens with a pledge to put residents first."
                    .to_string(),
            ),
            content: "Today we launch a people-centered campaign built on listening. Over \
                      the coming months we will hold open forums in every ward, publish \
                      our agenda in full, and report progress in the open."
                .to_string(),
            featured_image: None,
            author: None,
            category: Some("announcements".to_string()),
            status: ArticleStatus::Published,
            tags: vec!["launch".to_string(), "community".to_string()],
        },
        ArticleDraft {
            title: "Clean Water for Every Ward".to_string(),
            slug: Some("clean-water-plan".to_string()),
            excerpt: Some("Our three-phase plan to extend piped water access.".to_string()),
            content: "Access to clean water remains the most raised issue at our forums. \
                      The plan: rehabilitate existing boreholes, extend the piped network \
                      to underserved wards, and establish community water committees with \
                      published maintenance budgets."
                .to_string(),
            featured_image: None,
            author: None,
            category: Some("policy".to_string()),
            status: ArticleStatus::Published,
            tags: vec!["water".to_string(), "infrastructure".to_string()],
        },
        ArticleDraft {
            title: "Youth Employment Forum Draws Record Turnout".to_string(),
            slug: Some("youth-employment-forum".to_string()),
            excerpt: Some("Hundreds of young people shaped our jobs agenda.".to_string()),
            content: "The youth employment forum brought together students, artisans, and \
                      small business owners. Top proposals included a county apprenticeship \
                      fund and simplified licensing for youth-led enterprises. Both are now \
                      part of the campaign agenda."
                .to_string(),
            featured_image: None,
            author: None,
            category: Some("events".to_string()),
            status: ArticleStatus::Published,
            tags: vec!["youth".to_string(), "jobs".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use campaign_hub_core::ArticleStatus;

    use super::default_articles;

    #[test]
    fn seed_articles_are_published_with_stable_slugs() {
        let articles = default_articles();
        assert_eq!(articles.len(), 3);
        for article in &articles {
            assert_eq!(article.status, ArticleStatus::Published);
            assert!(article.slug.is_some());
        }
    }
}
