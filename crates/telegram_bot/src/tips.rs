use rand::seq::SliceRandom;

pub const TIPS: &[&str] = &[
    "Откладывайте 10% от каждого дохода сразу после его получения.",
    "Составьте список покупок перед походом в магазин и придерживайтесь его.",
    "Сравнивайте цены в нескольких магазинах перед крупной покупкой.",
    "Отмените подписки, которыми не пользовались последний месяц.",
    "Готовьте еду дома: это заметно дешевле, чем обедать в кафе.",
    "Создайте резервный фонд размером в три-шесть месячных расходов.",
    "Перед импульсивной покупкой подождите 24 часа.",
    "Платите по кредитным картам вовремя, чтобы не переплачивать проценты.",
    "Пользуйтесь кешбэком и программами лояльности для регулярных трат.",
    "Раз в месяц пересматривайте свои расходы по категориям.",
];

/// One tip, chosen uniformly at random.
pub(crate) fn random_tip() -> &'static str {
    TIPS.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TIPS[0])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn list_has_enough_distinct_tips() {
        let unique: HashSet<_> = TIPS.iter().collect();
        assert!(unique.len() >= 8);
        assert_eq!(unique.len(), TIPS.len());
    }

    #[test]
    fn random_tip_comes_from_the_list() {
        for _ in 0..50 {
            assert!(TIPS.contains(&random_tip()));
        }
    }
}
