use crate::templates::{
    contact_lines, education_items, experience_items, section, skill_items, CvInput, CvLayout,
    Header, SectionStyle, Template,
};

/// Single column with a timeline for experience and cards for education.
pub fn render(input: &CvInput<'_>) -> CvLayout {
    CvLayout {
        template: Template::Creative,
        header: Header {
            name: input.personal_info.name.clone(),
            initials: None,
            contact: contact_lines(input.personal_info),
        },
        sidebar: vec![],
        main: vec![
            section("Skills", SectionStyle::Chips, skill_items(input)),
            section("Experience", SectionStyle::Timeline, experience_items(input.experience)),
            section("Education", SectionStyle::Cards, education_items(input.education)),
        ],
    }
}
