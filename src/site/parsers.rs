//! Structural extraction from the in-house shop's product detail pages.
//! All anchors are fixed CSS classes from the shop template; the markup is
//! not under our control, so every field is best-effort.

use crate::catalog::price::parse_price;
use anyhow::{Result, anyhow};
use scraper::{Html, Selector};

/// Icon image filename → badge label. Two distinct filenames both mean NEW.
const ICON_LABELS: &[(&str, &str)] = &[
    ("/img/sys/new.gif", "NEW"),
    ("/img/sys/onsales.gif", "SALE"),
    ("/img/icon/10000001.png", "送料無料"),
    ("/img/icon/10000002.png", "よりどり対象"),
    ("/img/icon/10000003.png", "期間限定"),
    ("/img/icon/10000004.png", "クーポン進呈"),
    ("/img/icon/10000005.png", "会員限定"),
    ("/img/icon/10000006.png", "オンライン限定"),
    ("/img/icon/10000007.png", "NEW"),
];

/// Fields scraped from one product detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub code: Option<i64>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub point: Option<i64>,
    pub stock: Option<String>,
    pub icons: Vec<String>,
}

/// Parse a product detail page.
///
/// `Ok(None)` means the page has no product block — the code is legitimately
/// absent from the catalog and the caller skips it silently. `Err` means the
/// block is present but a mandatory field failed to parse; the caller counts
/// that as a skip too.
pub fn parse_product_page(html: &str) -> Result<Option<ProductPage>> {
    let doc = Html::parse_document(html);

    let detail_sel = sel("div.goodsproductdetail_")?;
    let Some(detail) = doc.select(&detail_sel).next() else {
        return Ok(None);
    };

    let mut page = ProductPage::default();

    // 商品コード — present but unparseable is a hard parse failure.
    if let Some(span) = detail.select(&sel("span.goodscode_id_number_")?).next() {
        let text = element_text(&span);
        let digits = text.replace("商品コード：", "");
        let code = digits
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("unparseable product code {:?}", text))?;
        page.code = Some(code);
    }

    if let Some(h2) = detail.select(&sel("h2.goods_rifhtname_")?).next() {
        page.name = Some(element_text(&h2));
    }

    // 価格 — sale price first, regular price as fallback.
    let sale_sel = sel("span.goods_detail_saleprice_")?;
    let regular_sel = sel("h2.goods_price_")?;
    let price_text = detail
        .select(&sale_sel)
        .next()
        .or_else(|| detail.select(&regular_sel).next())
        .map(|el| element_text(&el));
    if let Some(text) = price_text {
        let price =
            parse_price(&text).ok_or_else(|| anyhow!("unparseable price {:?}", text))?;
        page.price = Some(price);
    }

    for img in detail.select(&sel("div.icon_ img")?) {
        let src = img.value().attr("src").unwrap_or("");
        // Unknown filenames yield no badge.
        if let Some((_, label)) = ICON_LABELS.iter().find(|(s, _)| *s == src) {
            page.icons.push((*label).to_string());
        }
    }

    // ポイント — outside the detail block; parse failure is null, not fatal.
    if let Some(li) = doc.select(&sel("ul#point_stock li")?).next() {
        let text = element_text(&li).replace("ポイント：", "").replace("pt", "");
        page.point = text.trim().parse::<i64>().ok();
    }

    if let Some(td) = doc.select(&sel("tr.id_stock_msg_ td.id_txt")?).next() {
        page.stock = Some(element_text(&td));
    }

    Ok(Some(page))
}

fn sel(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("selector {}: {:?}", s, e))
}

fn element_text(el: &scraper::ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"
        <html><body>
        <div class="goodsproductdetail_">
          <span class="goodscode_id_number_">商品コード：12345</span>
          <h2 class="goods_rifhtname_">ブラジル ブルボン 200g</h2>
          <span class="goods_detail_saleprice_">1,080円（税込）</span>
          <div class="icon_">
            <img src="/img/sys/new.gif">
            <img src="/img/icon/10000001.png">
            <img src="/img/icon/99999999.png">
          </div>
        </div>
        <ul id="point_stock"><li>ポイント：10pt</li><li>その他</li></ul>
        <table><tr class="id_stock_msg_"><td class="id_txt">在庫あり</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn full_page_extracts_all_fields() {
        let page = parse_product_page(FULL_PAGE).unwrap().unwrap();
        assert_eq!(page.code, Some(12345));
        assert_eq!(page.name.as_deref(), Some("ブラジル ブルボン 200g"));
        assert_eq!(page.price, Some(1080.0));
        assert_eq!(page.point, Some(10));
        assert_eq!(page.stock.as_deref(), Some("在庫あり"));
        // Unknown icon filename is ignored.
        assert_eq!(page.icons, vec!["NEW".to_string(), "送料無料".to_string()]);
    }

    #[test]
    fn missing_detail_block_is_skip_not_error() {
        let html = "<html><body><p>お探しの商品は見つかりませんでした</p></body></html>";
        assert_eq!(parse_product_page(html).unwrap(), None);
    }

    #[test]
    fn regular_price_fallback() {
        let html = r#"
            <div class="goodsproductdetail_">
              <h2 class="goods_price_">2,160円（税込）</h2>
            </div>
        "#;
        let page = parse_product_page(html).unwrap().unwrap();
        assert_eq!(page.price, Some(2160.0));
    }

    #[test]
    fn unparseable_code_is_error() {
        let html = r#"
            <div class="goodsproductdetail_">
              <span class="goodscode_id_number_">商品コード：未定</span>
            </div>
        "#;
        assert!(parse_product_page(html).is_err());
    }

    #[test]
    fn point_parse_failure_is_null() {
        let html = r#"
            <div class="goodsproductdetail_"></div>
            <ul id="point_stock"><li>ポイント：キャンペーン中</li></ul>
        "#;
        let page = parse_product_page(html).unwrap().unwrap();
        assert_eq!(page.point, None);
    }

    #[test]
    fn second_new_icon_filename_also_maps_to_new() {
        let html = r#"
            <div class="goodsproductdetail_">
              <div class="icon_"><img src="/img/icon/10000007.png"></div>
            </div>
        "#;
        let page = parse_product_page(html).unwrap().unwrap();
        assert_eq!(page.icons, vec!["NEW".to_string()]);
    }
}
