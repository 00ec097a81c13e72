//! Fixed formatting blocks and task templates.

/// Required answer when the document does not contain the information.
pub const NOT_FOUND_PHRASE: &str = "Sorry, I could not find this information in the file.";

/// Plain structured layout used for quizzes.
pub const PLAIN_QUIZ_FORMAT: &str = "\
Format the answer as plain text without Markdown syntax (avoid *word*, **word**, #, etc.).
For quizzes, use the following layout with a blank line between items:

Question [number]: [Question]

A) [Option]

B) [Option]

C) [Option]

D) [Option]

Only give the answers if asked to.

Leave a blank line between questions.
Example:

Question 1: What is the main goal of biochemistry?

A) Studying macroscopic properties

B) Understanding chemical processes

C) Developing new drugs

D) Studying the functions of organs


Question 2: ...";

/// Lightweight markup for prose answers.
pub const MARKDOWN_FORMAT: &str = "\
Format the answer in Markdown for clear display.
- Use **bold** for important terms.
- Use bullet lists (`-`) for key points.
- Separate paragraphs with a blank line.
- Avoid headings (#) unless explicitly requested.";

pub fn quiz(format: &str, filename: &str, context: &str) -> String {
    format!(
        "{format}\n\
         Based on the following content extracted from the file '{filename}': {context},\n\
         generate a quiz of 3 multiple-choice questions (4 options per question) with the correct answers.\n"
    )
}

pub fn document_qa(format: &str, filename: &str, context: &str, query: &str) -> String {
    format!(
        "{format}\n\
         Based on the following content extracted from the file '{filename}': {context},\n\
         answer the following question: {query}\n\
         Give a clear and concise answer based only on the content of the file.\n\
         If the question does not match any information in the file, say: \"{NOT_FOUND_PHRASE}\"\n"
    )
}

pub fn general_qa(format: &str, query: &str) -> String {
    format!(
        "{format}\n\
         You are an academic assistant for university students.\n\
         Answer the following question clearly and concisely: {query}\n"
    )
}
