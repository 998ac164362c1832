use crate::templates::{
    contact_lines, education_items, experience_items, section, skill_items, CvInput, CvLayout,
    Header, SectionStyle, Template,
};

/// Single column: header, skills, experience, education.
pub fn render(input: &CvInput<'_>) -> CvLayout {
    CvLayout {
        template: Template::Minimal,
        header: Header {
            name: input.personal_info.name.clone(),
            initials: None,
            contact: contact_lines(input.personal_info),
        },
        sidebar: vec![],
        main: vec![
            section("Skills", SectionStyle::Chips, skill_items(input)),
            section("Experience", SectionStyle::List, experience_items(input.experience)),
            section("Education", SectionStyle::List, education_items(input.education)),
        ],
    }
}
