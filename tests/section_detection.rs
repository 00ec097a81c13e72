use docchat_core::document::{detect_sections, HeuristicDetector, Page, Section, SectionDetector};

fn make_page(number: u32, text: &str) -> Page {
    Page::detect(number, text, &HeuristicDetector)
}

fn titles(sections: &[Section]) -> Vec<&str> {
    sections.iter().map(Section::title).collect()
}

const COURSE_PAGE: &str = "1. Introduction\nWhy heat flows.\n\nChapter 2 Thermodynamics\nFirst law.\nChapter 3 Waves\nStanding waves.";

#[test]
fn invariant_detection_is_idempotent() {
    let first = detect_sections(COURSE_PAGE);
    let second = detect_sections(COURSE_PAGE);

    assert_eq!(first, second);
}

#[test]
fn invariant_spans_are_in_bounds() {
    let texts = [
        COURSE_PAGE,
        "Unité 3 Énergie\nLa chaleur est une forme d'énergie.",
        "II. RÉSULTATS ET DISCUSSION\nCorps du texte.",
        "Partie IV\n\n12. conclusion",
    ];

    for text in texts {
        for section in detect_sections(text) {
            assert!(section.start() < section.end(), "{section:?}");
            assert!(section.end() <= text.len(), "{section:?}");
            assert!(text.is_char_boundary(section.start()));
            assert!(text.is_char_boundary(section.end()));
        }
    }
}

#[test]
fn invariant_sections_ordered_by_start() {
    let sections = detect_sections(COURSE_PAGE);

    assert_eq!(sections.len(), 3);
    assert!(sections.windows(2).all(|w| w[0].start() <= w[1].start()));
    assert!(sections[0].title().starts_with("1. Introduction"));
    assert_eq!(sections[1].title(), "Chapter 2 Thermodynamics");
    assert_eq!(sections[2].title(), "Chapter 3 Waves");
}

#[test]
fn invariant_titles_unique_first_kept() {
    let text = "Chapter 1\nfirst body\nChapter 1\nsecond body";
    let sections = detect_sections(text);

    assert_eq!(titles(&sections), vec!["Chapter 1"]);
    assert_eq!(sections[0].start(), 0);
}

#[test]
fn keyword_span_runs_to_next_keyword() {
    let sections = detect_sections(COURSE_PAGE);
    let chapter_2 = &sections[1];

    let span = &COURSE_PAGE[chapter_2.start()..chapter_2.end()];
    assert_eq!(span, "Chapter 2 Thermodynamics\nFirst law.\n");
}

#[test]
fn upper_case_heading_is_one_line() {
    let text = "II. RESULTS AND DISCUSSION\nThe measured values agree.";
    let sections = detect_sections(text);

    assert_eq!(titles(&sections), vec!["II. RESULTS AND DISCUSSION"]);
    assert_eq!(sections[0].end(), "II. RESULTS AND DISCUSSION".len());
}

#[test]
fn numbered_heading_runs_to_blank_line() {
    let text = "3. Methods used\nwe sampled twice\n\nunrelated prose";
    let sections = detect_sections(text);

    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title(), "3. Methods used\nwe sampled twice");
}

#[test]
fn french_keywords_and_accents() {
    let sections = detect_sections("Unité 3 Énergie\nLa chaleur est une forme d'énergie.");

    assert_eq!(titles(&sections), vec!["Unité 3 Énergie"]);
}

#[test]
fn plain_prose_has_no_sections() {
    let sections = detect_sections("just some lower-case prose about entropy and heat.");

    assert!(sections.is_empty());
}

#[test]
fn lower_case_roman_numeral_is_not_a_heading() {
    assert!(detect_sections("see chapter iv for details").is_empty());
    assert_eq!(detect_sections("Chapter IV Optics").len(), 1);
}

#[test]
fn slide_title_is_first_section() {
    let text = "Thermodynamics\nHeat & work\nEntropy\n";
    let page = Page::detect_slide(1, text, Some("Thermodynamics"), &HeuristicDetector);

    assert_eq!(page.sections()[0].title(), "Thermodynamics");
    assert_eq!(page.sections()[0].start(), 0);
    assert_eq!(page.sections()[0].end(), "Thermodynamics".len());
}

#[test]
fn unreadable_page_has_no_sections() {
    let page = Page::unreadable(4);

    assert_eq!(page.page_number(), 4);
    assert!(page.is_blank());
    assert!(!page.has_sections());
}

#[test]
fn custom_detector_plugs_into_pages() {
    struct FirstLine;

    impl SectionDetector for FirstLine {
        fn detect(&self, text: &str) -> Vec<Section> {
            let line = text.lines().next().unwrap_or_default();
            Section::new(line, 0, line.len(), text).into_iter().collect()
        }
    }

    let page = Page::detect(1, "anything at all\nmore", &FirstLine);
    assert_eq!(titles(page.sections()), vec!["anything at all"]);

    let default_page = make_page(1, "anything at all\nmore");
    assert!(!default_page.has_sections());
}

#[test]
fn section_rejects_invalid_spans() {
    let text = "été";

    assert!(Section::new("x", 2, 2, text).is_err());
    assert!(Section::new("x", 0, 99, text).is_err());
    assert!(Section::new("x", 0, 1, text).is_err());
    assert!(Section::new("x", 0, 2, text).is_ok());
}
