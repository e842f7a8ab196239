//! Parse-group-batch pipeline over multiple pages of markup.

use cg_import_core::{
    PageScores, Playtype, Site, build_batches, group_by_version, parse_page,
};
use scraper::Html;
use url::Url;

fn row(code: &str, version: &str, id: &str) -> String {
    format!(
        r#"<div class="grid-x">
  <div class="cell">
    <a href="/iidx/music/{version}/{id}"><strong>Song</strong></a>
    <strong>{code}</strong>
    <span class="label">CLEAR</span>
  </div>
  <div class="cell"></div>
  <div class="cell">
    <strong title="500 PGREAT, 250 GREAT, 4 MC">1,250 EX</strong>
    <div class="grid-y">
      <div class="cell">AAA</div>
      <div class="cell">12th May 2024, 18:00 UTC</div>
    </div>
  </div>
</div>"#
    )
}

fn page(rows: &[String]) -> Html {
    Html::parse_document(&format!(
        r#"<html><body><div class="score-grid">{}</div></body></html>"#,
        rows.join("\n")
    ))
}

#[test]
fn two_pages_group_into_three_batches() {
    // Page 1: two SP and one DP score for version 29.
    let page1 = page(&[
        row("SPA", "29", "100"),
        row("SPH", "29", "101"),
        row("DPA", "29", "102"),
    ]);
    // Page 2: one SP score for version 30 plus a BEGINNER row that must
    // vanish without a trace.
    let page2 = page(&[row("SPN", "30", "200"), row("SPB", "30", "201")]);

    let mut all = PageScores::default();
    all.extend(parse_page(&page1).unwrap());
    all.extend(parse_page(&page2).unwrap());
    assert_eq!(all.len(), 4);

    let groups = group_by_version(all.sp, all.dp);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["29"].sp.len(), 2);
    assert_eq!(groups["29"].dp.len(), 1);
    assert_eq!(groups["30"].sp.len(), 1);
    assert!(groups["30"].dp.is_empty());

    let url = Url::parse("https://ganymede-cg.net/iidx/profile").unwrap();
    let service = Site::from_url(&url).unwrap().service_name();
    let batches = build_batches(groups, &service);

    assert_eq!(batches.len(), 3);
    let keys: Vec<(&str, Playtype)> = batches
        .iter()
        .map(|b| (b.meta.version.as_str(), b.meta.playtype))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("29", Playtype::Sp),
            ("29", Playtype::Dp),
            ("30", Playtype::Sp),
        ]
    );
    for batch in &batches {
        assert_eq!(batch.meta.service, "kt-cg-iidx-importer (GAN)");
        assert!(!batch.scores.is_empty());
    }
}
