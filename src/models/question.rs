use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::BankError;

/// 单道选择题，只能通过 `Question::new` 构造，之后不可变
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    /// 正确选项下标（从 0 开始）
    correct_index: usize,
}

impl Question {
    /// 创建题目并校验：题干非空、至少两个选项、正确下标有效
    ///
    /// 校验失败时 `block`/`line` 为 0，由解析器补充位置信息
    pub fn new(
        text: impl Into<String>,
        answers: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, BankError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(BankError::MissingText { block: 0, line: 0 });
        }
        if answers.len() < 2 {
            return Err(BankError::TooFewAnswers {
                block: 0,
                line: 0,
                count: answers.len(),
            });
        }
        if correct_index >= answers.len() {
            return Err(BankError::CorrectIndexOutOfRange {
                block: 0,
                line: 0,
                index: correct_index as i64 + 1,
                answers: answers.len(),
            });
        }
        Ok(Self {
            text,
            answers,
            correct_index,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.answers.get(self.correct_index).map(String::as_str)
    }
}

/// 题库：一次加载、一次洗牌，之后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self { questions })
    }

    /// 均匀随机打乱题目顺序（Fisher–Yates）
    pub fn shuffle_with<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.questions.shuffle(rng);
        self
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn q(text: &str) -> Question {
        Question::new(text, vec!["a".into(), "b".into()], 1).unwrap()
    }

    #[test]
    fn test_question_rejects_bad_correct_index() {
        let err = Question::new("x", vec!["a".into(), "b".into()], 2).unwrap_err();
        assert!(matches!(
            err,
            BankError::CorrectIndexOutOfRange { index: 3, answers: 2, .. }
        ));
    }

    #[test]
    fn test_question_rejects_single_answer() {
        let err = Question::new("x", vec!["a".into()], 0).unwrap_err();
        assert!(matches!(err, BankError::TooFewAnswers { count: 1, .. }));
    }

    #[test]
    fn test_accessors_expose_validated_fields() {
        let question = Question::new("Pick", vec!["yes".into(), "no".into()], 1).unwrap();
        assert_eq!(question.text(), "Pick");
        assert_eq!(question.answers(), ["yes", "no"]);
        assert_eq!(question.correct_index(), 1);
        assert_eq!(question.correct_answer(), Some("no"));
        assert!(question.is_correct(1));
        assert!(!question.is_correct(0));
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert_eq!(QuestionBank::new(Vec::new()).unwrap_err(), BankError::Empty);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible_permutation() {
        let questions: Vec<Question> = (0..8).map(|i| q(&format!("q{i}"))).collect();
        let bank = QuestionBank::new(questions.clone()).unwrap();

        let a = bank.clone().shuffle_with(&mut StdRng::seed_from_u64(7));
        let b = bank.shuffle_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);

        let mut sorted: Vec<_> = a.iter().map(|q| q.text().to_string()).collect();
        sorted.sort();
        let mut expected: Vec<_> = questions.iter().map(|q| q.text().to_string()).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_every_position_reachable_by_shuffle() {
        // 3 道题共 6 种排列，足够多的种子应该全部覆盖
        let bank = QuestionBank::new(vec![q("a"), q("b"), q("c")]).unwrap();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            let order: Vec<String> = bank
                .clone()
                .shuffle_with(&mut StdRng::seed_from_u64(seed))
                .iter()
                .map(|q| q.text().to_string())
                .collect();
            seen.insert(order);
        }
        assert_eq!(seen.len(), 6);
    }
}
