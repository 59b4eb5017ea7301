use anyhow::Context;

use appealwall_client::{Client, ClientConfig};
use appealwall_navigation::View;
use appealwall_pagination::PaginatedList;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    appealwall_observability::init(ClientConfig::log_format_from_env());

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, store = %config.store_path.display(), "starting");

    let client = Client::from_config(config).context("failed to open session store")?;
    client.health().check().await;

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let nav = client
        .navigate(&path)
        .await
        .with_context(|| format!("navigation to {path} failed"))?;

    tracing::info!(
        path = %nav.target.full_path,
        view = ?nav.target.route.view,
        title = nav.title.as_deref().unwrap_or(""),
        redirected = nav.was_redirected(),
        logged_in = client.sessions().is_logged_in(),
        "navigated"
    );

    match nav.target.route.view {
        Some(View::AnnouncementList) => {
            let mut list = client.announcements();
            show_first_page(&mut list, |a| format!("#{} {}", a.id, a.title)).await?;
        }
        Some(View::QuestionList) => {
            let mut list = client.questions();
            show_first_page(&mut list, |q| {
                format!("#{} [{}] {}", q.id, q.campus_name(), appealwall_core::truncate(&q.content, 40, "..."))
            })
            .await?;
        }
        _ => {}
    }

    Ok(())
}

async fn show_first_page<T, S>(
    list: &mut PaginatedList<T, S>,
    line: impl Fn(&T) -> String,
) -> anyhow::Result<()>
where
    T: appealwall_pagination::Identified + Send,
    S: appealwall_pagination::PageSource<T>,
{
    let page = list.load_first_page().await.context("failed to load list")?;
    for item in page.items {
        println!("{}", line(item));
    }
    if page.end_of_stream {
        println!("-- end --");
    }
    Ok(())
}
