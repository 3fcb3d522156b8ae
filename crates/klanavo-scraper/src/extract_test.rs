use super::*;

const BASE: &str = "https://www.kleinanzeigen.de";

fn ad_block(classes: &str, adid: &str, href: &str, inner: &str) -> String {
    format!(
        r#"<li class="{classes}"><article class="aditem" data-adid="{adid}" data-href="{href}">{inner}</article></li>"#
    )
}

// -----------------------------------------------------------------------
// extract_listings
// -----------------------------------------------------------------------

#[test]
fn extracts_normal_ad_and_skips_top_ad() {
    let html = r#"
    <div class="ad-listitem">
      <article data-adid="321" data-href="/s-anzeige/tolles-rad/321">
        <h2 class="text-module-begin"><a class="ellipsis">Tolles Rad</a></h2>
        <p class="aditem-main--middle--price-shipping--price">1.234 € VB</p>
        <p class="aditem-main--middle--description">Guter Zustand</p>
      </article>
    </div>
    <div class="ad-listitem is-topad">
      <article data-adid="999" data-href="/s-anzeige/ignore/999"></article>
    </div>
    "#;

    let ads = extract_listings(html, BASE);
    assert_eq!(ads.len(), 1);
    let ad = &ads[0];
    assert_eq!(ad.adid, "321");
    assert_eq!(
        ad.url,
        "https://www.kleinanzeigen.de/s-anzeige/tolles-rad/321"
    );
    assert_eq!(ad.price, "1234");
    assert_eq!(ad.title, "Tolles Rad");
    assert_eq!(ad.description, "Guter Zustand");
}

#[test]
fn skips_pro_badge_variant() {
    let html = format!(
        "{}{}",
        ad_block("ad-listitem badge-hint-pro-small-srp", "1", "/s-anzeige/pro/1", ""),
        ad_block("ad-listitem", "2", "/s-anzeige/normal/2", ""),
    );
    let ads = extract_listings(&html, BASE);
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].adid, "2");
}

#[test]
fn skips_candidate_without_adid() {
    let html = format!(
        "{}{}",
        ad_block("ad-listitem", "", "/s-anzeige/no-id/1", ""),
        ad_block("ad-listitem", "7", "/s-anzeige/ok/7", ""),
    );
    let ads = extract_listings(&html, BASE);
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].adid, "7");
}

#[test]
fn skips_candidate_without_link() {
    let html = r#"
    <li class="ad-listitem"><article data-adid="5"></article></li>
    <li class="ad-listitem"><article data-adid="6" data-href="  "></article></li>
    "#;
    assert!(extract_listings(html, BASE).is_empty());
}

#[test]
fn skips_list_item_without_article() {
    let html = r#"<li class="ad-listitem"><div>Werbung</div></li>"#;
    assert!(extract_listings(html, BASE).is_empty());
}

#[test]
fn missing_price_element_yields_empty_price() {
    let html = ad_block(
        "ad-listitem",
        "42",
        "/s-anzeige/sofa/42",
        r#"<h2 class="text-module-begin"><a class="ellipsis">Sofa</a></h2>"#,
    );
    let ads = extract_listings(&html, BASE);
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].price, "");
    assert_eq!(ads[0].description, "");
}

#[test]
fn keeps_document_order() {
    let html = format!(
        "{}{}{}",
        ad_block("ad-listitem", "3", "/s-anzeige/c/3", ""),
        ad_block("ad-listitem", "1", "/s-anzeige/a/1", ""),
        ad_block("ad-listitem", "2", "/s-anzeige/b/2", ""),
    );
    let ids: Vec<String> = extract_listings(&html, BASE)
        .into_iter()
        .map(|l| l.adid)
        .collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
}

#[test]
fn description_whitespace_is_collapsed() {
    let html = ad_block(
        "ad-listitem",
        "9",
        "/s-anzeige/tisch/9",
        "<p class=\"aditem-main--middle--description\">Massiver\n      Tisch <b>mit</b>   Stühlen</p>",
    );
    let ads = extract_listings(&html, BASE);
    assert_eq!(ads[0].description, "Massiver Tisch mit Stühlen");
}

#[test]
fn base_url_trailing_slash_is_ignored() {
    let html = ad_block("ad-listitem", "8", "/s-anzeige/lampe/8", "");
    let ads = extract_listings(&html, "http://127.0.0.1:9000/");
    assert_eq!(ads[0].url, "http://127.0.0.1:9000/s-anzeige/lampe/8");
}

#[test]
fn absolute_href_is_kept_as_is() {
    let html = ad_block(
        "ad-listitem",
        "8",
        "https://www.kleinanzeigen.de/s-anzeige/lampe/8",
        "",
    );
    let ads = extract_listings(&html, "http://127.0.0.1:9000");
    assert_eq!(ads[0].url, "https://www.kleinanzeigen.de/s-anzeige/lampe/8");
}

#[test]
fn empty_document_yields_no_listings() {
    assert!(extract_listings("", BASE).is_empty());
}

// -----------------------------------------------------------------------
// normalize_price
// -----------------------------------------------------------------------

#[test]
fn price_strips_currency_and_separators() {
    assert_eq!(normalize_price("1.234 €"), "1234");
}

#[test]
fn price_strips_negotiable_suffix() {
    assert_eq!(normalize_price("85 € VB"), "85");
}

#[test]
fn price_without_digits_is_empty() {
    assert_eq!(normalize_price("Zu verschenken"), "");
}

#[test]
fn price_empty_input_is_empty() {
    assert_eq!(normalize_price(""), "");
}
