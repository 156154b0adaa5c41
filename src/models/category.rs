use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Main → sub → leaf categories offered by the upload form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryTree {
    pub main_categories: Vec<MainCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MainCategory {
    pub name: String,
    pub sub_categories: Vec<SubCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubCategory {
    pub name: String,
    pub leaf_categories: Vec<String>,
}

impl SubCategory {
    fn new(name: &str, leaves: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            leaf_categories: leaves.iter().map(|leaf| leaf.to_string()).collect(),
        }
    }
}

impl MainCategory {
    fn new(name: &str, subs: Vec<SubCategory>) -> Self {
        Self {
            name: name.to_string(),
            sub_categories: subs,
        }
    }
}

impl CategoryTree {
    pub fn standard() -> Self {
        Self {
            main_categories: vec![
                MainCategory::new("기계", vec![
                    SubCategory::new("건설기계", &["불도저", "크레인"]),
                    SubCategory::new("공작기계", &["CNC 선반", "연삭기"]),
                    SubCategory::new("산업기계", &["굴착기", "유압 프레스"]),
                    SubCategory::new("제조기계", &["사출 성형기", "열 성형기"]),
                ]),
                MainCategory::new("공구", vec![
                    SubCategory::new("수공구", &["전동드릴", "플라이어", "해머"]),
                    SubCategory::new("전동공구", &["그라인더", "전동톱", "해머드릴"]),
                    SubCategory::new("절삭공구", &["가스 용접기", "커터"]),
                    SubCategory::new("측정공구", &["마이크로미터", "하이트 게이지"]),
                ]),
                MainCategory::new("장비", vec![
                    SubCategory::new("안전장비", &[
                        "헬멧", "방진 마스크", "낙하 방지벨트", "안전모", "안전화",
                        "보호안경", "귀마개", "보호장갑", "호흡 보호구",
                    ]),
                    SubCategory::new("운송장비", &["리프트 장비", "체인 블록", "호이스트"]),
                ]),
                MainCategory::new("약품", vec![
                    SubCategory::new("의약품", &["인슐린", "항생제"]),
                    SubCategory::new("화공약품", &["황산", "염산"]),
                ]),
            ],
        }
    }
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::standard()
    }
}
