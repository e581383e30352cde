use sniff::selector::SearchHit;

/// Print one plain-text line per hit.
pub(crate) fn print_hits(hits: &[SearchHit<'_>]) {
    for hit in hits {
        println!("{}", format_hit(hit));
    }
}

fn format_hit(hit: &SearchHit<'_>) -> String {
    format!("{} (score: {})", hit.path, hit.score)
}
