//! Prompt Builder — deterministic construction of the two generation prompts
//! from a prompt selection, plus the single-shot extraction instructions.
//!
//! Pure string work only: same selection in, same prompts out. The templates
//! interpolate exactly the four trait fields. "Other" free-text substitution
//! happens upstream in `selection::resolve_choice` — by the time a selection
//! reaches this module the literal "Other" must already be gone, and this
//! module never special-cases it.

use crate::errors::AppError;
use crate::models::selection::PromptSelectionRow;

/// Instructions for the cover letter generation call.
/// Replace: {tone_preference}, {main_strength}, {experience_level}, {career_motivation}
const COVERLETTER_PROMPT_TEMPLATE: &str = r#"ROLE
You are an experienced HR/TA professional. Generate a print-ready cover letter.

HARD RULES
- Output plain text only (no Markdown).
- Do not output square brackets or placeholder text of any kind.
- If a value is not provided, omit that line entirely (do not invent data).
- Keep to 2-3 short paragraphs for the body; total 250-300 words.
- Match the selected tone and the language of the job posting if specified.
- Use only the information provided below; do not fabricate facts.

Applicant profile
Cover Letter Tone: {tone_preference}
Main Professional Strength: {main_strength}
Experience Level: {experience_level}
Career Motivation: {career_motivation}

STRUCTURE TO FOLLOW
1) Greeting line: "Dear <recipient or Hiring Team>,"
2) Body: 2-3 concise paragraphs (250-300 words) explicitly mapping my highlights to the role's requirements.
   - Be concrete; use metrics from highlights if present.
   - Frame my experience level appropriately and highlight my main strength.
   - Match the requested tone/language.
   - Include exactly one sentence that references a short video pitch; do NOT insert any placeholder link.
     Use wording like: "Here you can find a short video pitch to further elaborate on my skills."
3) Closing: "Sincerely," on its own line; on the next line print my name if provided, otherwise omit the name line.

EXEMPLAR — STYLE ONLY (do not copy nouns, dates, numbers, or phrases)
---
Dear HR Team,
In response to your five reasons on why to join your team, here are five ways I can contribute. Points 1 & 2 are covered in my short video pitch. There I elaborate more on how the term "smooth" has accompanied me in my life, being solution-focused, and my relationship with coffee.

3. A role such as yours necessitates the ability to multi-task and juggle changing priorities in a fast-paced environment. From my former position as an executive assistant at Caritas I have experience with supporting management while heading projects and taking on various tasks in day-to-day operations. For instance, during the refugee wave I was tasked with setting up the infrastructure for a refugee camp on top of my usual responsibilities. That included setting up the offices as well as developing budgets, applying for grants and organizing short-term support. Key skills here were understanding the big picture, being decisive and a good communicator.

4. Willingness to dive in and figure it out. In another case one of the departments was not doing as well as expected. That became especially evident when comparing the revenue per full-time position and staff utilization. It was my responsibility to determine how best to proceed and which changes to make. After comparing the key figures and procedures to those of other departments, I re-evaluated the cost structure, set up new sources of income and revised staff deployment. That led to an increase of the department's revenue of 12%. At this point, I don't know what the day-to-day challenges will be. But I look forward to diving in and figuring them out.

5. Humor. I really like to laugh and find the humor in situations. Usually with a cup of tea in hand. Please let me know if you have any further questions. I look forward to hearing from you,
Name of sender
---

STYLE NOTES TO EMULATE FROM THE EXEMPLAR
- Direct, concise opening anchored to the specific company/role.
- Evidence-driven middle (map my highlights to JD requirements; use metrics only if provided).
- Friendly-professional voice; clear close with a forward-looking line.
- If the exemplar uses bullets, you may use a brief list ONLY if my CV/JD lines are already bullet-like; otherwise stick to paragraphs.
- Never mention entities from the exemplar (company names, cities, figures); it shows style, not content.

IMPORTANT FORMATTING NOTES
- No bullets unless they already exist in the CV highlights and naturally fit into a single short list.
- No headers/titles beyond the conventional letter format.
- Remove any empty lines that would arise from missing values; avoid more than one consecutive blank line.

Produce only the final letter text, ready to print."#;

/// Instructions for the video pitch script generation call.
/// Replace: {tone_preference}, {main_strength}, {experience_level}, {career_motivation}
const PITCH_PROMPT_TEMPLATE: &str = r#"You are an AI career coach. Based on my applicant profile below, generate a first-person video pitch script I can record. The pitch must run 60-90 seconds total.

Applicant profile:
- Video Tone: {tone_preference}
- Main Professional Strength (PRIMARY FOCUS): {main_strength}
- Experience Level: {experience_level}
- Career Motivation (PRIMARY FOCUS): {career_motivation}

Priority & content rules:
- Allocate ~65% of the script to the two PRIMARY FOCUS items (strength + motivation).
- For Strength: include ONE concrete, recent example with an observable outcome (metric, speed-up, risk reduced, user impact, etc.). Do not invent one.
- For Motivation: 1-2 lines on why this motivates me AND how it maps to team/role impact (no generic "I'm passionate").
- Avoid resume lists; pick 1-2 crisp moments only. No jargon, no filler, no placeholders.

Non-fabrication rules (strict):
- Use only the facts in the profile above and in the provided resume.
- Never create company names, teams, titles, locations, dates, or metrics that aren't provided.
- If no concrete example is available, do NOT invent one; instead describe in 2-3 lines how I typically demonstrate this strength, with no specific names, dates, or numbers.

Constraints:
- 135-200 words (aim ~165) to fit 60-90 seconds at natural speaking pace.
- Conversational, confident, and {tone_preference} in tone. Write in first person ("I...").
- Short, speakable sentences. Light stage directions in [brackets] only where helpful.

Structure (with loose timestamps):
- 0:00 Hook (1-2 lines): introduction by name, quick human opener that hints at my {career_motivation}.
- 0:10 Strength + proof (2-4 lines): spotlight {main_strength} with ONE concrete example and outcome.
- 0:35 Motivation & fit (2-3 lines): connect {career_motivation} to the value I'd create in the role/team.
- 0:55 Experience frame (1-2 lines): position my {experience_level} level succinctly (no list).
- 1:10 Call-to-action (1-2 lines): invite next step; warm, concise close.

Output format:
1) Total word count at the top (e.g., "~170 words").
2) Script with timestamps:
   [0:00] ...
   [0:10] ...
   [0:35] ...
   [0:55] ...
   [1:10] ..."#;

/// Instructions for the company name extraction call — plain text only.
pub const COMPANY_NAME_INSTRUCTIONS: &str = "From the job description I give to you, \
    extract the company name that I'm applying to. RULES: respond with the company \
    name only — plain text, no talking or chatting, no confirmation message, no \
    explanation. Just the company name.";

/// Instructions for the job title extraction call — plain text only.
pub const JOB_TITLE_INSTRUCTIONS: &str = "From the job description I give to you, \
    extract the role title that I'm applying to. RULES: respond with the role title \
    only — plain text, no talking or chatting, no confirmation message, no \
    explanation. Just the role title.";

/// Both generation prompts built from one selection.
#[derive(Debug, Clone)]
pub struct SelectionPrompts {
    pub coverletter: String,
    pub pitch: String,
}

/// Builds both prompts, rejecting selections with any blank trait field.
pub fn build_prompts(selection: &PromptSelectionRow) -> Result<SelectionPrompts, AppError> {
    Ok(SelectionPrompts {
        coverletter: build_coverletter_prompt(selection)?,
        pitch: build_pitch_prompt(selection)?,
    })
}

pub fn build_coverletter_prompt(selection: &PromptSelectionRow) -> Result<String, AppError> {
    validate_selection(selection)?;
    Ok(interpolate(COVERLETTER_PROMPT_TEMPLATE, selection))
}

pub fn build_pitch_prompt(selection: &PromptSelectionRow) -> Result<String, AppError> {
    validate_selection(selection)?;
    Ok(interpolate(PITCH_PROMPT_TEMPLATE, selection))
}

fn interpolate(template: &str, selection: &PromptSelectionRow) -> String {
    template
        .replace("{tone_preference}", selection.tone_preference.trim())
        .replace("{main_strength}", selection.main_strength.trim())
        .replace("{experience_level}", selection.experience_level.trim())
        .replace("{career_motivation}", selection.career_motivation.trim())
}

fn validate_selection(selection: &PromptSelectionRow) -> Result<(), AppError> {
    for (name, value) in [
        ("tone_preference", &selection.tone_preference),
        ("main_strength", &selection.main_strength),
        ("experience_level", &selection.experience_level),
        ("career_motivation", &selection.career_motivation),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Selection field '{name}' must not be blank"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn selection(tone: &str, strength: &str, level: &str, motivation: &str) -> PromptSelectionRow {
        PromptSelectionRow {
            id: Uuid::new_v4(),
            application_id: Some(Uuid::new_v4()),
            user_id: None,
            tone_preference: tone.to_string(),
            main_strength: strength.to_string(),
            experience_level: level.to_string(),
            career_motivation: motivation.to_string(),
            profile_name: None,
            is_default_profile: false,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompts_contain_all_four_fields_verbatim() {
        let sel = selection("Professional", "Leadership", "Senior", "Impact");
        let prompts = build_prompts(&sel).unwrap();

        for prompt in [&prompts.coverletter, &prompts.pitch] {
            assert!(prompt.contains("Professional"));
            assert!(prompt.contains("Leadership"));
            assert!(prompt.contains("Senior"));
            assert!(prompt.contains("Impact"));
        }
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let sel = selection("Friendly", "Problem solving", "Mid-level", "Growth");
        let first = build_prompts(&sel).unwrap();
        let second = build_prompts(&sel).unwrap();
        assert_eq!(first.coverletter, second.coverletter);
        assert_eq!(first.pitch, second.pitch);
    }

    #[test]
    fn test_no_placeholder_survives_interpolation() {
        let sel = selection("Confident", "Mentoring", "Staff", "Autonomy");
        let prompts = build_prompts(&sel).unwrap();
        for prompt in [&prompts.coverletter, &prompts.pitch] {
            assert!(!prompt.contains("{tone_preference}"));
            assert!(!prompt.contains("{main_strength}"));
            assert!(!prompt.contains("{experience_level}"));
            assert!(!prompt.contains("{career_motivation}"));
        }
    }

    #[test]
    fn test_substituted_other_choice_flows_through_verbatim() {
        // Upstream normalization replaced "Other" with the free-text value;
        // the builder just interpolates it.
        let sel = selection(
            "Professional",
            "Shipping ML pipelines end to end",
            "Senior",
            "Working on climate problems",
        );
        let prompts = build_prompts(&sel).unwrap();
        assert!(prompts
            .coverletter
            .contains("Shipping ML pipelines end to end"));
        assert!(prompts.pitch.contains("Working on climate problems"));
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let sel = selection("Professional", "  ", "Senior", "Impact");
        let err = build_prompts(&sel).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("main_strength"));
    }

    #[test]
    fn test_coverletter_prompt_carries_structural_rules() {
        let sel = selection("Professional", "Leadership", "Senior", "Impact");
        let prompt = build_coverletter_prompt(&sel).unwrap();
        assert!(prompt.contains("250-300 words"));
        assert!(prompt.contains("do not fabricate"));
        assert!(prompt.contains("video pitch"));
    }

    #[test]
    fn test_coverletter_prompt_carries_style_exemplar() {
        let sel = selection("Professional", "Leadership", "Senior", "Impact");
        let prompt = build_coverletter_prompt(&sel).unwrap();

        assert!(prompt.contains("EXEMPLAR — STYLE ONLY"));
        assert!(prompt.contains("STYLE NOTES TO EMULATE FROM THE EXEMPLAR"));

        // The exemplar is static scaffolding: no selection field lands inside
        // its fenced block.
        let block_start = prompt.find("EXEMPLAR — STYLE ONLY").unwrap();
        let block_end = prompt.find("STYLE NOTES TO EMULATE").unwrap();
        let exemplar = &prompt[block_start..block_end];
        for field in ["Leadership", "Senior", "Impact"] {
            assert!(!exemplar.contains(field));
        }
    }

    #[test]
    fn test_pitch_prompt_carries_word_budget_and_timestamps() {
        let sel = selection("Professional", "Leadership", "Senior", "Impact");
        let prompt = build_pitch_prompt(&sel).unwrap();
        assert!(prompt.contains("135-200 words"));
        assert!(prompt.contains("[0:00]"));
    }
}
