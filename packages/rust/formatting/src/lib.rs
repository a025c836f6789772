//! Text-reformatting filters for primary (Hebrew/Aramaic) and secondary
//! (English) text.
//!
//! Every function here is a pure string transform. Callers pick a pipeline by
//! language and, for comments, by commentary kind.

pub mod filters;

/// Primary-language text of the main document. Passed through unchanged.
pub fn primary_text(text: &str) -> String {
    text.to_string()
}

/// Standard secondary-language pipeline, used for both sections and comments.
pub fn secondary_text(text: &str) -> String {
    filters::remove_section_symbols(&filters::sanitize_links(text))
}

/// Primary-language pipeline for a comment of the given kind.
pub fn primary_comment_text(text: &str, kind: &str) -> String {
    let mut result = filters::small_to_emphasis(text);
    result = filters::strip_commentary_prefix(&result);
    result = filters::bold_dibur_hamatchil(&result, kind);
    result
}

/// Secondary-language pipeline for a comment of the given kind.
pub fn secondary_comment_text(text: &str, kind: &str) -> String {
    let result = secondary_text(text);
    if kind == "Jastrow" {
        return filters::reformat_jastrow(&result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_pipeline_composes() {
        let input = r#"§ See <a href="/x">Rashi</a>"#;
        assert_eq!(secondary_text(input), "See Rashi");
    }

    #[test]
    fn jastrow_only_for_jastrow() {
        let input = "a<br><br>b";
        assert_eq!(secondary_comment_text(input, "Jastrow"), "a<br>b");
        assert_eq!(secondary_comment_text(input, "Rashi"), input);
    }

    #[test]
    fn primary_comment_pipeline_order() {
        let input = "גמ' <small>אמר</small> רבא";
        assert_eq!(
            primary_comment_text(input, "Verses"),
            r#"<span class="hebrew-emphasis">אמר</span> רבא"#
        );

        // Label goes before the lemma is bolded.
        assert_eq!(
            primary_comment_text("גמ' מאימתי - תנא", "Rashi"),
            "<b>מאימתי</b> - תנא"
        );
    }
}
