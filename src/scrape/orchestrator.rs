//! The top-level scrape drive loop.
//!
//! For each target rating: apply the filter (skip the rating if that
//! fails), collect pages until the quota, the page ceiling or the feed runs
//! out, then clear filters before the next rating. The page context is
//! released on every exit path; only session-level failures (launch,
//! navigation) escape as errors.

use super::collect::collect_page;
use super::filter::{FilterController, FilterState};
use super::paginate::{self, MAX_PAGES_PER_RATING};
use super::session::ScrapeSession;
use super::types::{ScrapeConfig, ScrapeOutcome};
use super::{wait_for_feed, SETTLE_SHORT};
use crate::error::ScrapeError;
use crate::events::{EventBus, ScrapeEvent};
use crate::product::ProductInfo;
use crate::renderer::{PageContext, Renderer};
use tracing::{debug, info, warn};

/// Run one scrape session end to end.
pub async fn run(
    renderer: &dyn Renderer,
    config: &ScrapeConfig,
    bus: &EventBus,
) -> Result<ScrapeOutcome, ScrapeError> {
    config.validate()?;
    let product = ProductInfo::from_url(&config.url);

    let mut page = renderer
        .new_page()
        .await
        .map_err(ScrapeError::BrowserLaunch)?;

    bus.emit(ScrapeEvent::ScrapeStarted {
        url: config.url.clone(),
        target_ratings: config.target_ratings.clone(),
        max_per_rating: config.max_reviews_per_rating,
    });

    let mut session = ScrapeSession::new();
    info!(session = %session.id, url = %config.url, "scrape session starting");

    let driven = drive(page.as_mut(), config, &mut session, bus).await;

    // Release the browser context no matter how the drive ended.
    let _ = page.close().await;

    match driven {
        Ok(()) => {
            let summary = session.summary();
            info!(
                session = %session.id,
                total = summary.total_reviews,
                pages = summary.pages_visited,
                "scrape session complete"
            );
            bus.emit(ScrapeEvent::ScrapeComplete {
                total_reviews: summary.total_reviews,
                pages_visited: summary.pages_visited,
                elapsed_ms: summary.elapsed_ms,
            });
            Ok(ScrapeOutcome {
                reviews: session.into_reviews(),
                summary,
                product,
            })
        }
        Err(error) => {
            bus.emit(ScrapeEvent::ScrapeFailed {
                error: error.to_string(),
            });
            Err(error)
        }
    }
}

async fn drive(
    page: &mut dyn PageContext,
    config: &ScrapeConfig,
    session: &mut ScrapeSession,
    bus: &EventBus,
) -> Result<(), ScrapeError> {
    page.navigate(&config.url, config.nav_timeout_ms)
        .await
        .map_err(|source| ScrapeError::Navigation {
            url: config.url.clone(),
            source,
        })?;
    wait_for_feed(&*page, config.wait_timeout_ms).await;

    for &rating in &config.target_ratings {
        let mut filter = FilterController::new(&*page);

        if !filter.apply(rating).await {
            warn!(rating, "filter application failed, skipping rating");
            bus.emit(ScrapeEvent::FilterFailed { rating });
            continue;
        }
        match filter.state() {
            FilterState::Drift(active) => bus.emit(ScrapeEvent::FilterDrift {
                rating,
                active: active.clone(),
                repaired: false,
            }),
            _ => bus.emit(ScrapeEvent::FilterApplied { rating }),
        }

        let mut pages_this_rating = 1;
        session.pages_visited += 1;
        loop {
            let collected = session.collected_for(rating);
            let Some(quota) = config
                .max_reviews_per_rating
                .checked_sub(collected)
                .filter(|q| *q > 0)
            else {
                break;
            };

            let harvest =
                collect_page(&*page, session, rating, quota, config.wait_timeout_ms).await;
            debug!(
                rating,
                page = pages_this_rating,
                new = harvest.new_reviews.len(),
                duplicates = harvest.duplicates,
                "page collected"
            );
            bus.emit(ScrapeEvent::PageCollected {
                rating,
                page: pages_this_rating,
                new_reviews: harvest.new_reviews.len(),
                duplicates: harvest.duplicates,
            });

            if harvest.new_reviews.is_empty() {
                debug!(rating, "nothing new on this page, rating exhausted");
                break;
            }
            if session.collected_for(rating) >= config.max_reviews_per_rating {
                debug!(rating, "per-rating quota reached");
                break;
            }
            if pages_this_rating >= MAX_PAGES_PER_RATING {
                warn!(rating, "page ceiling reached, stopping this rating");
                break;
            }
            if !paginate::next_page(&*page, config.wait_timeout_ms).await {
                debug!(rating, "no further pages");
                break;
            }
            pages_this_rating += 1;
            session.pages_visited += 1;
        }

        // Clearing here keeps the exclusivity invariant at the start of
        // the next rating's pass.
        let _ = filter.clear_all().await;
        bus.emit(ScrapeEvent::RatingComplete {
            rating,
            collected: session.collected_for(rating),
        });
        tokio::time::sleep(SETTLE_SHORT).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::mock::{fixtures, ClickEffect, MockPage, MockRenderer, NodeSpec};
    use crate::scrape::selectors;

    const URL: &str = "https://www.tokopedia.com/shop/item-abc12/review";

    fn config(ratings: &[u8], max: usize) -> ScrapeConfig {
        ScrapeConfig {
            url: URL.into(),
            target_ratings: ratings.to_vec(),
            max_reviews_per_rating: max,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_single_rating() {
        let dom = MockPage::new();
        fixtures::filter_panel(&dom, &[]);
        fixtures::review_article(&dom, 0, "Budi", "barang sesuai pesanan, mantap", 5);
        fixtures::review_article(&dom, 0, "Sari", "pengiriman cepat sekali", 5);

        let renderer = MockRenderer::new(dom.clone());
        let bus = EventBus::default();
        let outcome = run(&renderer, &config(&[5], 15), &bus).await.unwrap();

        assert_eq!(outcome.reviews.len(), 2);
        assert!(outcome.reviews.iter().all(|r| r.rating_filter == 5));
        assert_eq!(outcome.summary.by_filter.get(&5), Some(&2));
        assert_eq!(outcome.product.store_name, "Shop");
        assert_eq!(dom.closes(), 1);
        assert_eq!(dom.navigations(), vec![URL.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_respected_across_pages() {
        let dom = MockPage::new();
        fixtures::filter_panel(&dom, &[]);
        let second = dom.add_page();
        for i in 0..10 {
            fixtures::review_article(&dom, 0, &format!("A{i}"), &format!("ulasan halaman satu {i}"), 5);
            fixtures::review_article(&dom, second, &format!("B{i}"), &format!("ulasan halaman dua {i}"), 5);
        }
        fixtures::next_button(&dom, 0);

        let renderer = MockRenderer::new(dom.clone());
        let bus = EventBus::default();
        let outcome = run(&renderer, &config(&[5], 15), &bus).await.unwrap();

        assert_eq!(outcome.reviews.len(), 15);
        assert_eq!(dom.current_page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_filter_skips_rating_and_continues() {
        // Panel only knows ratings 4 and 5: every strategy fails for
        // 1, 2 and 3, which must yield zero records while 4 and 5 proceed.
        let dom = MockPage::new();
        for rating in [5u8, 4] {
            let container = dom.add_node(NodeSpec::new());
            dom.place_global(selectors::RATING_FILTER_CONTAINERS, container);
            dom.place_global(selectors::FILTER_LABELS, container);
            let checkbox = dom.add_node(
                NodeSpec::new()
                    .attr("type", "checkbox")
                    .effect(ClickEffect::ToggleChecked),
            );
            dom.attach(container, selectors::CHECKBOX, checkbox);
            let label = dom.add_node(NodeSpec::new().text(&rating.to_string()));
            dom.attach(container, selectors::LABEL_TEXTS, label);
        }
        fixtures::review_article(&dom, 0, "Budi", "barang sesuai pesanan, mantap", 4);
        fixtures::review_article(&dom, 0, "Sari", "pengiriman cepat sekali", 4);

        let renderer = MockRenderer::new(dom.clone());
        let bus = EventBus::default();
        let mut events = bus.subscribe();
        let outcome = run(&renderer, &config(&[1, 2, 3, 4, 5], 15), &bus)
            .await
            .unwrap();

        // The first succeeding pass (rating 4) owns both articles; later
        // passes see only duplicates.
        assert_eq!(outcome.reviews.len(), 2);
        assert!(outcome
            .reviews
            .iter()
            .all(|r| ![1, 2, 3].contains(&r.rating_filter)));

        let mut failed = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let ScrapeEvent::FilterFailed { rating } = event {
                failed.push(rating);
            }
        }
        assert_eq!(failed, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_ceiling_stops_runaway_pagination() {
        let dom = MockPage::new();
        fixtures::filter_panel(&dom, &[]);
        fixtures::review_article(&dom, 0, "User0", "ulasan nomor nol panjang", 5);
        fixtures::next_button(&dom, 0);
        for i in 1..14 {
            let idx = dom.add_page();
            fixtures::review_article(
                &dom,
                idx,
                &format!("User{i}"),
                &format!("ulasan nomor {i} panjang"),
                5,
            );
            fixtures::next_button(&dom, idx);
        }

        let renderer = MockRenderer::new(dom.clone());
        let bus = EventBus::default();
        let outcome = run(&renderer, &config(&[5], 100), &bus).await.unwrap();

        assert_eq!(outcome.reviews.len(), MAX_PAGES_PER_RATING);
        assert_eq!(outcome.summary.pages_visited, MAX_PAGES_PER_RATING);
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_is_fatal() {
        let renderer = MockRenderer::broken();
        let bus = EventBus::default();
        let result = run(&renderer, &config(&[5], 15), &bus).await;
        assert!(matches!(result, Err(ScrapeError::BrowserLaunch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_rejected_before_launch() {
        let renderer = MockRenderer::broken();
        let bus = EventBus::default();
        let mut bad = config(&[5], 15);
        bad.url = "https://www.evil.com/x".into();
        let result = run(&renderer, &bad, &bus).await;
        assert!(matches!(result, Err(ScrapeError::InvalidConfig(_))));
    }
}
