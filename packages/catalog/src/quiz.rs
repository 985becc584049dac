use serde::Serialize;

/// One multiple-choice question. `correct` indexes into `options` and is
/// never serialized to clients; grading happens server-side.
#[derive(Clone, Copy, Debug, Serialize, utoipa::ToSchema)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    #[serde(skip)]
    pub correct: usize,
}

struct QuizBank {
    group_id: &'static str,
    questions: &'static [QuizQuestion],
}

static BANKS: &[QuizBank] = &[
    QuizBank {
        group_id: "tatars",
        questions: &[
            QuizQuestion {
                prompt: "Как называется татарский праздник окончания весенних полевых работ?",
                options: &["Сабантуй", "Навруз", "Ысыах", "Акатуй"],
                correct: 0,
            },
            QuizQuestion {
                prompt: "Какое блюдо представляет собой треугольный пирожок с мясом и картофелем?",
                options: &["Чак-чак", "Эчпочмак", "Бэлиш", "Кыстыбый"],
                correct: 1,
            },
            QuizQuestion {
                prompt: "Какая башня казанского кремля носит имя легендарной царицы?",
                options: &["Спасская", "Тайницкая", "Сююмбике", "Преображенская"],
                correct: 2,
            },
        ],
    },
    QuizBank {
        group_id: "bashkirs",
        questions: &[
            QuizQuestion {
                prompt: "Как называется башкирский духовой инструмент из стебля зонтичного растения?",
                options: &["Домбра", "Курай", "Кубыз", "Сорнай"],
                correct: 1,
            },
            QuizQuestion {
                prompt: "Какой эпос считается вершиной башкирского народного творчества?",
                options: &["Урал-батыр", "Манас", "Джангар", "Гэсэр"],
                correct: 0,
            },
            QuizQuestion {
                prompt: "Каким промыслом башкиры славятся на всю страну?",
                options: &["Оленеводством", "Бортевым пчеловодством", "Китобойным делом", "Виноделием"],
                correct: 1,
            },
        ],
    },
    QuizBank {
        group_id: "sakha",
        questions: &[
            QuizQuestion {
                prompt: "Как называется якутский героический эпос, включённый в список ЮНЕСКО?",
                options: &["Олонхо", "Калевала", "Нарты", "Урал-батыр"],
                correct: 0,
            },
            QuizQuestion {
                prompt: "Какой праздник встречи лета отмечают в Якутии кумысом и осуохаем?",
                options: &["Сабантуй", "Сурхарбан", "Ысыах", "Акатуй"],
                correct: 2,
            },
            QuizQuestion {
                prompt: "Какой музыкальный инструмент — символ якутской культуры?",
                options: &["Варган (хомус)", "Курай", "Балалайка", "Чатхан"],
                correct: 0,
            },
        ],
    },
    QuizBank {
        group_id: "buryats",
        questions: &[
            QuizQuestion {
                prompt: "Какая религия традиционна для большинства бурят?",
                options: &["Буддизм", "Православие", "Ислам", "Католичество"],
                correct: 0,
            },
            QuizQuestion {
                prompt: "Как называется традиционное бурятское блюдо из теста с мясом, приготовленное на пару?",
                options: &["Пельмени", "Буузы", "Хинкали", "Манты"],
                correct: 1,
            },
            QuizQuestion {
                prompt: "На берегу какого озера исторически расселены буряты?",
                options: &["Ладожское", "Онежское", "Байкал", "Таймыр"],
                correct: 2,
            },
        ],
    },
    QuizBank {
        group_id: "ossetians",
        questions: &[
            QuizQuestion {
                prompt: "Потомками какого древнего народа считаются осетины?",
                options: &["Скифов и алан", "Хазар", "Половцев", "Готов"],
                correct: 0,
            },
            QuizQuestion {
                prompt: "Сколько пирогов подают на осетинский праздничный стол?",
                options: &["Два", "Три", "Пять", "Семь"],
                correct: 1,
            },
            QuizQuestion {
                prompt: "Как называется осетинский героический эпос?",
                options: &["Нартский", "Олонхо", "Джангар", "Калевала"],
                correct: 0,
            },
        ],
    },
    QuizBank {
        group_id: "nenets",
        questions: &[
            QuizQuestion {
                prompt: "Как называется переносное жилище ненцев-оленеводов?",
                options: &["Юрта", "Яранга", "Чум", "Иглу"],
                correct: 2,
            },
            QuizQuestion {
                prompt: "Какое животное — основа традиционного хозяйства ненцев?",
                options: &["Лошадь", "Северный олень", "Верблюд", "Як"],
                correct: 1,
            },
            QuizQuestion {
                prompt: "На каком полуострове живёт большинство ненцев?",
                options: &["Камчатка", "Таймыр", "Ямал", "Кольский"],
                correct: 2,
            },
        ],
    },
];

/// The question bank for a group, if one has been authored.
pub fn quiz_for(group_id: &str) -> Option<&'static [QuizQuestion]> {
    BANKS
        .iter()
        .find(|b| b.group_id == group_id)
        .map(|b| b.questions)
}

/// Grade a submitted answer sheet against a bank.
///
/// `answers[i]` is the chosen option index for question `i`. A missing or
/// out-of-range answer counts as wrong. Returns per-question correctness;
/// the score is the number of `true`s.
pub fn grade(bank: &[QuizQuestion], answers: &[usize]) -> Vec<bool> {
    bank.iter()
        .enumerate()
        .map(|(i, q)| answers.get(i) == Some(&q.correct))
        .collect()
}
