use gradus_core::Chapter;

// Thesis rollup. A thesis without chapters reports zero; every trigger site
// (chapter update, creation, deletion) applies the same policy.
pub fn overall_percentage(chapters: &[Chapter]) -> u8 {
    if chapters.is_empty() {
        return 0;
    }

    let sum: u32 = chapters
        .iter()
        .map(|chapter| u32::from(chapter.completion_percentage))
        .sum();
    let mean = f64::from(sum) / chapters.len() as f64;
    mean.round() as u8
}
