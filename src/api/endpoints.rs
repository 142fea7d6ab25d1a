// URL builders for the Riot endpoints the client touches.

pub const SUMMONER_BY_NAME: &str = "lol/summoner/v4/summoners/by-name";
pub const LEAGUE_BY_SUMMONER: &str = "lol/league/v4/entries/by-summoner";
pub const MATCH_IDS_BY_PUUID: &str = "lol/match/v5/matches/by-puuid";
pub const MATCH_BY_ID: &str = "lol/match/v5/matches";

pub fn regional_routing(platform: &str) -> &'static str {
    match platform {
        "na1" | "br1" | "la1" | "la2" => "americas",
        "euw1" | "eun1" | "tr1" | "ru" => "europe",
        "kr" | "jp1" => "asia",
        "oc1" | "ph2" | "sg2" | "th2" | "vn2" => "sea",
        _ => "americas", // default
    }
}

pub fn summoner_by_name(platform: &str, name: &str, api_key: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/{}/{}?api_key={}",
        platform, SUMMONER_BY_NAME, name, api_key
    )
}

pub fn league_entries(platform: &str, summoner_id: &str, api_key: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/{}/{}?api_key={}",
        platform, LEAGUE_BY_SUMMONER, summoner_id, api_key
    )
}

pub fn match_id_page(
    platform: &str,
    puuid: &str,
    start: usize,
    count: usize,
    api_key: &str,
) -> String {
    format!(
        "https://{}.api.riotgames.com/{}/{}/ids?start={}&count={}&api_key={}",
        regional_routing(platform),
        MATCH_IDS_BY_PUUID,
        puuid,
        start,
        count,
        api_key
    )
}

pub fn match_by_id(platform: &str, match_id: &str, api_key: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/{}/{}?api_key={}",
        regional_routing(platform),
        MATCH_BY_ID,
        match_id,
        api_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_endpoints_use_regional_host() {
        assert_eq!(
            match_id_page("euw1", "abc", 1, 30, "KEY"),
            "https://europe.api.riotgames.com/lol/match/v5/matches/by-puuid/abc/ids?start=1&count=30&api_key=KEY"
        );
        assert!(match_by_id("kr", "KR_1", "KEY").starts_with("https://asia.api.riotgames.com/"));
    }

    #[test]
    fn test_platform_endpoints_use_platform_host() {
        assert!(summoner_by_name("na1", "TLDaBaby", "KEY")
            .starts_with("https://na1.api.riotgames.com/lol/summoner/v4/summoners/by-name/TLDaBaby"));
    }
}
