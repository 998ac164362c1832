use crate::templates::{
    contact_lines, education_items, experience_items, section, skill_items, CvInput, CvLayout,
    Header, Item, SectionStyle, Template,
};

/// Two columns: a sidebar with contact details and skills, experience and education in the main column.
pub fn render(input: &CvInput<'_>) -> CvLayout {
    let contact = contact_lines(input.personal_info);
    CvLayout {
        template: Template::Modern,
        header: Header {
            name: input.personal_info.name.clone(),
            initials: Some(initials(&input.personal_info.name)),
            contact: contact.clone(),
        },
        sidebar: vec![
            section(
                "Contact",
                SectionStyle::Contact,
                contact.into_iter().map(Item::Contact).collect(),
            ),
            section("Skills", SectionStyle::Chips, skill_items(input)),
        ],
        main: vec![
            section("Experience", SectionStyle::List, experience_items(input.experience)),
            section("Education", SectionStyle::List, education_items(input.education)),
        ],
    }
}

/// First letter of every word in the name, upper-cased.
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}
