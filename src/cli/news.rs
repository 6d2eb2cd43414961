//! CLI handler for the news feed.

use crate::flow::{AuthorizationFlow, NewsPage};

/// Handle `newstler news`.
pub async fn handle_news(
    flow: &AuthorizationFlow,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match flow.news(user_id).await {
        Ok(NewsPage::Feed { profile, articles }) => {
            match &profile.position {
                Some(position) => println!("📰 News for {} ({position})\n", profile.display_name),
                None => println!("📰 News for {}\n", profile.display_name),
            }
            if articles.is_empty() {
                println!("  No news yet.");
            }
            for article in articles {
                println!("  • {}  {}", article.title, article.link);
            }
            Ok(())
        }
        Ok(NewsPage::Reauthorize) => {
            println!("🔗 LinkedIn account is not linked. Run `newstler link` first.");
            Ok(())
        }
        Err(err) => {
            super::report_failure(&err);
            std::process::exit(1);
        }
    }
}
