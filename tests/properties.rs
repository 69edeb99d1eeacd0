//! Property tests for page-break calculation and pagination

use lesson_pages::{
    compute_page_breaks, paginate_html, BlockBox, BlockId, EditingSurface, PageBreakRenderer,
    PageBreakSet, PaginationConfig, PaginationController, PassOutcome, Result, SurfaceBlock, A4,
};
use proptest::prelude::*;

const USABLE: f32 = 983.0;

#[derive(Clone, Copy)]
struct Block(f32);

impl BlockBox for Block {
    fn bounding_height(&self) -> Option<f32> {
        Some(self.0)
    }

    fn margin_top(&self) -> Option<f32> {
        None
    }

    fn margin_bottom(&self) -> Option<f32> {
        None
    }
}

struct Surface {
    heights: Vec<f32>,
    height: f32,
}

impl EditingSurface for Surface {
    type Block = Block;

    fn is_attached(&self) -> bool {
        true
    }

    fn top_level_blocks(&self) -> Result<Vec<SurfaceBlock<Block>>> {
        Ok(ids(self.heights.len())
            .into_iter()
            .zip(&self.heights)
            .map(|(id, &h)| SurfaceBlock { id, node: Block(h) })
            .collect())
    }

    fn set_height(&mut self, height: f32) -> Result<()> {
        self.height = height;
        Ok(())
    }
}

fn ids(count: usize) -> Vec<BlockId> {
    (0..count).map(|i| BlockId(format!("b{}", i))).collect()
}

fn heights() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(1.0f32..1500.0, 0..60)
}

fn inline_token() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,10}",
        1 => Just("&amp;".to_string()),
        1 => Just("&lt;".to_string()),
        1 => Just("&gt;".to_string()),
        1 => "[a-z]{1,8}".prop_map(|word| format!("<strong>{}</strong>", word)),
        1 => "[a-z]{1,8}"
            .prop_map(|word| format!(r#"<a href="/lessons/{}">{}</a>"#, word, word)),
        1 => Just("<br>".to_string()),
    ]
}

fn block() -> impl Strategy<Value = String> {
    let text = prop::collection::vec(inline_token(), 1..60)
        .prop_map(|tokens| tokens.join(" "))
        .boxed();
    prop_oneof![
        4 => text.clone().prop_map(|text| format!("<p>{}</p>", text)),
        1 => ("[a-z]{1,8}", text.clone()).prop_map(|(class, text)| {
            format!(r#"<p class="{}" data-id="{}">{}</p>"#, class, class, text)
        }),
        1 => (1u8..=3, text.clone())
            .prop_map(|(level, text)| format!("<h{}>{}</h{}>", level, text, level)),
        1 => prop::collection::vec(text, 1..5).prop_map(|items| {
            let items: String = items.iter().map(|item| format!("<li>{}</li>", item)).collect();
            format!("<ul>{}</ul>", items)
        }),
        1 => (1u32..2000, 1u32..800).prop_map(|(width, height)| {
            format!(
                r#"<img src="figure.png" alt="figure" width="{}" height="{}">"#,
                width, height
            )
        }),
        1 => Just("<hr>".to_string()),
    ]
}

fn document() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(block(), 1..40)
}

proptest! {
    #[test]
    fn breaks_are_deterministic(heights in heights()) {
        let first = compute_page_breaks(heights.iter().copied().enumerate(), USABLE);
        let second = compute_page_breaks(heights.iter().copied().enumerate(), USABLE);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pages_partition_blocks(heights in heights()) {
        let breaks = compute_page_breaks(heights.iter().copied().enumerate(), USABLE);
        prop_assert!(breaks.page_count >= 1);
        prop_assert_eq!(breaks.page_count, breaks.breaks.len() + 1);

        if heights.is_empty() {
            prop_assert!(breaks.breaks.is_empty());
            return Ok(());
        }

        let ranges = breaks.page_ranges(heights.len());
        prop_assert_eq!(ranges.len(), breaks.page_count);
        prop_assert_eq!(ranges[0].start, 0);
        prop_assert_eq!(ranges[ranges.len() - 1].end, heights.len());
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for (range, &break_index) in ranges.iter().skip(1).zip(&breaks.breaks) {
            prop_assert_eq!(range.start, break_index);
        }
        // The first block never starts a new page
        prop_assert!(!breaks.breaks.contains(&0));
        prop_assert!(ranges.iter().all(|range| !range.is_empty()));
    }

    #[test]
    fn pages_fill_greedily(heights in heights()) {
        let breaks = compute_page_breaks(heights.iter().copied().enumerate(), USABLE);
        let ranges = breaks.page_ranges(heights.len());

        let mut previous: Option<f32> = None;
        for range in ranges {
            let page = &heights[range];
            let total = page.iter().fold(0.0f32, |sum, h| sum + h);
            if page.len() > 1 {
                prop_assert!(total <= USABLE);
            }
            // A page only ends when its next block would overflow it
            if let Some(previous_total) = previous {
                prop_assert!(previous_total + page[0] > USABLE);
            }
            previous = Some(total);
        }
    }

    #[test]
    fn decorations_number_pages_in_order(heights in heights()) {
        let block_ids = ids(heights.len());
        let breaks = compute_page_breaks(
            block_ids.iter().cloned().zip(heights.iter().copied()),
            USABLE,
        );
        let page_count = breaks.page_count;
        let set = PageBreakSet::from(breaks);

        let decorations = PageBreakRenderer::new(&set, 24.0).decorations(&block_ids);
        prop_assert_eq!(decorations.len() + 1, page_count);
        for (index, decoration) in decorations.iter().enumerate() {
            prop_assert_eq!(decoration.page_number, index + 2);
        }
    }

    #[test]
    fn controller_matches_calculator(heights in heights()) {
        let surface = Surface { heights: heights.clone(), height: 0.0 };
        let mut controller = PaginationController::new(surface, &PaginationConfig::default());
        controller.recalculate();

        let expected: PageBreakSet = compute_page_breaks(
            ids(heights.len()).into_iter().zip(heights.iter().copied()),
            A4.usable_height(),
        )
        .into();
        prop_assert_eq!(controller.break_set(), &expected);
        prop_assert!(controller.page_count() > expected.len());

        // A second pass over the same layout publishes nothing
        prop_assert_eq!(controller.recalculate(), PassOutcome::Unchanged);
        prop_assert_eq!(controller.break_set(), &expected);
        let applied = controller.surface().map(|surface| surface.height);
        prop_assert_eq!(applied, Some(controller.surface_height()));
    }

    #[test]
    fn preview_chunks_reassemble_document(blocks in document()) {
        let html: String = blocks.concat();
        let chunks = paginate_html(&html).unwrap();

        prop_assert!(!chunks.is_empty());
        for (index, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.page_number, index + 1);
            prop_assert!(!chunk.html.is_empty());
        }
        let reassembled: String = chunks.iter().map(|chunk| chunk.html.as_str()).collect();
        prop_assert_eq!(reassembled, html);
    }
}
