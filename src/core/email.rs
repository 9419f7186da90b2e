use crate::domain::model::{Question, SurveyResponseDetail};
use crate::utils::validation::is_valid_email;

/// Locates the respondent's email in a survey response.
///
/// Questions whose heading mentions "email" are checked first, using only
/// their first answer. If none of those yields a valid address, every answer
/// text is scanned in page, question, answer order. The first valid address
/// wins either way.
pub fn extract_email(detail: &SurveyResponseDetail) -> Option<String> {
    find_by_heading(detail).or_else(|| find_in_any_answer(detail))
}

fn questions(detail: &SurveyResponseDetail) -> impl Iterator<Item = &Question> {
    detail.pages.iter().flat_map(|page| page.questions.iter())
}

fn find_by_heading(detail: &SurveyResponseDetail) -> Option<String> {
    questions(detail)
        .filter(|question| {
            question
                .heading
                .as_deref()
                .is_some_and(|heading| heading.to_lowercase().contains("email"))
        })
        .filter_map(|question| question.answers.first())
        .filter_map(|answer| answer.text.as_deref())
        .find(|text| is_valid_email(text))
        .map(str::to_string)
}

fn find_in_any_answer(detail: &SurveyResponseDetail) -> Option<String> {
    questions(detail)
        .flat_map(|question| question.answers.iter())
        .filter_map(|answer| answer.text.as_deref())
        .find(|text| is_valid_email(text))
        .map(str::to_string)
}
