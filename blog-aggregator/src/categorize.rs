use crate::types::Category;

/// Keyword lists one provider uses to guess a post's category.
/// Keywords are matched as lower-case substrings.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    pub life: &'static [&'static str],
    pub tech: &'static [&'static str],
}

impl KeywordSet {
    fn matches(keywords: &[&str], candidate: &str) -> bool {
        keywords
            .iter()
            .any(|keyword| candidate.contains(&keyword.to_lowercase()))
    }
}

/// Guess a category from tags, topics or free text.
///
/// A life keyword anywhere wins over any tech keyword. With no match at all
/// the post is filed under life.
pub fn infer_category<I, S>(candidates: I, keywords: &KeywordSet) -> Category
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lowered: Vec<String> = candidates
        .into_iter()
        .map(|c| c.as_ref().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    if lowered.iter().any(|c| KeywordSet::matches(keywords.life, c)) {
        return Category::Life;
    }
    if lowered.iter().any(|c| KeywordSet::matches(keywords.tech, c)) {
        return Category::Tech;
    }
    Category::Life
}
